//! 실행기 설정 -- intg-runner.toml 파싱 및 런타임 설정
//!
//! [`RunnerSettings`]는 실행 속성 파일(테스트 플랜/인프라)과 별개로,
//! 실행기 자체의 고정 값(도구 이름, 호스트 파일 경로, 트러스트 스토어,
//! 저장 디렉토리, 제품 프로파일)을 담습니다. 파일이 없으면 기본값을 사용합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`INTG_TOOLS_BUILD=mvnw` 형식)
//! 3. 설정 파일 (`intg-runner.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), intg_core::error::IntgError> {
//! use intg_core::config::RunnerSettings;
//!
//! // 파일이 있으면 로드, 없으면 기본값 + 환경변수 오버라이드
//! let settings = RunnerSettings::load_or_default("intg-runner.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let settings = RunnerSettings::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, IntgError};
use crate::profile::ProductProfile;
use crate::types::ProductId;

/// 기본 설정 파일 이름
pub const DEFAULT_SETTINGS_FILE: &str = "intg-runner.toml";

/// intg-runner 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralSettings,
    /// 입력/출력 파일
    #[serde(default)]
    pub inputs: InputSettings,
    /// 외부 도구
    #[serde(default)]
    pub tools: ToolSettings,
    /// 호스트/트러스트 스토어
    #[serde(default)]
    pub environment: EnvironmentSettings,
    /// 저장 디렉토리
    #[serde(default)]
    pub storage: StorageSettings,
    /// 소스 획득
    #[serde(default)]
    pub source: SourceSettings,
    /// 제품별 프로파일 (내장 프로파일보다 우선)
    #[serde(default)]
    pub products: BTreeMap<String, ProductProfile>,
}

impl RunnerSettings {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IntgError> {
        let mut settings = Self::from_file(path).await?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// 파일이 있으면 [`load`](Self::load), 없으면 기본값에 환경변수를 적용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, IntgError> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await? {
            return Self::load(path).await;
        }
        debug!(path = %path.display(), "settings file not found, using defaults");
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IntgError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IntgError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IntgError::Io(e)
            }
        })?;
        let settings = Self::parse(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IntgError> {
        toml::from_str(toml_str).map_err(|e| {
            IntgError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `INTG_{SECTION}_{FIELD}`
    /// 예: `INTG_ENVIRONMENT_HOSTS_FILE=/tmp/hosts`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "INTG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "INTG_GENERAL_LOG_FORMAT");

        // Inputs
        override_string(&mut self.inputs.test_plan_file, "INTG_INPUTS_TEST_PLAN_FILE");
        override_string(&mut self.inputs.infra_file, "INTG_INPUTS_INFRA_FILE");
        override_string(&mut self.inputs.output_file, "INTG_INPUTS_OUTPUT_FILE");

        // Tools
        override_string(&mut self.tools.git, "INTG_TOOLS_GIT");
        override_string(&mut self.tools.build, "INTG_TOOLS_BUILD");
        override_string(&mut self.tools.openssl, "INTG_TOOLS_OPENSSL");
        override_string(&mut self.tools.keytool, "INTG_TOOLS_KEYTOOL");

        // Environment
        override_string(&mut self.environment.hosts_file, "INTG_ENVIRONMENT_HOSTS_FILE");
        override_string(
            &mut self.environment.trust_store_file,
            "INTG_ENVIRONMENT_TRUST_STORE_FILE",
        );
        override_string(
            &mut self.environment.trust_store_password,
            "INTG_ENVIRONMENT_TRUST_STORE_PASSWORD",
        );
        override_string(
            &mut self.environment.trust_store_alias,
            "INTG_ENVIRONMENT_TRUST_STORE_ALIAS",
        );

        // Storage
        override_string(&mut self.storage.log_dir, "INTG_STORAGE_LOG_DIR");
        override_string(&mut self.storage.product_dir, "INTG_STORAGE_PRODUCT_DIR");
        override_string(&mut self.storage.report_file, "INTG_STORAGE_REPORT_FILE");

        // Source
        override_bool(&mut self.source.pin_latest_tag, "INTG_SOURCE_PIN_LATEST_TAG");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IntgError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let required = [
            ("inputs.test_plan_file", &self.inputs.test_plan_file),
            ("inputs.infra_file", &self.inputs.infra_file),
            ("inputs.output_file", &self.inputs.output_file),
            ("tools.git", &self.tools.git),
            ("tools.build", &self.tools.build),
            ("tools.openssl", &self.tools.openssl),
            ("tools.keytool", &self.tools.keytool),
            ("environment.hosts_file", &self.environment.hosts_file),
            ("environment.trust_store_file", &self.environment.trust_store_file),
            ("environment.trust_store_alias", &self.environment.trust_store_alias),
            ("storage.log_dir", &self.storage.log_dir),
            ("storage.product_dir", &self.storage.product_dir),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        for (product, profile) in &self.products {
            if profile.integration_module.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("products.{product}.integration_module"),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// 제품 프로파일을 찾습니다.
    ///
    /// 설정 파일의 `[products.<id>]` → 내장 프로파일 → 기본 프로파일 순입니다.
    pub fn profile(&self, product: &ProductId) -> ProductProfile {
        self.products
            .get(product.as_str())
            .cloned()
            .or_else(|| ProductProfile::builtin(product))
            .unwrap_or_default()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 입력/출력 파일 설정 (작업 디렉토리 기준)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// 테스트 플랜 속성 파일
    pub test_plan_file: String,
    /// 인프라 속성 파일
    pub infra_file: String,
    /// 실행 요약 출력 파일
    pub output_file: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            test_plan_file: "testplan-props.properties".to_owned(),
            infra_file: "infrastructure.properties".to_owned(),
            output_file: "output.properties".to_owned(),
        }
    }
}

/// 외부 도구 프로그램 이름
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// 버전 관리 클라이언트
    pub git: String,
    /// 빌드 도구
    pub build: String,
    /// TLS 도구
    pub openssl: String,
    /// 인증서 등록 도구
    pub keytool: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            git: "git".to_owned(),
            build: "mvn".to_owned(),
            openssl: "openssl".to_owned(),
            keytool: "keytool".to_owned(),
        }
    }
}

/// 호스트 파일 및 트러스트 스토어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// 정적 이름 해석 파일
    pub hosts_file: String,
    /// 트러스트 스토어 파일 이름 (인증서 디렉토리 기준)
    pub trust_store_file: String,
    /// 트러스트 스토어 비밀번호
    pub trust_store_password: String,
    /// 인증서 별칭
    pub trust_store_alias: String,
    /// 중간 인증서 텍스트 파일 이름
    pub certificate_text_file: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            hosts_file: "/etc/hosts".to_owned(),
            trust_store_file: "wso2carbon.jks".to_owned(),
            trust_store_password: "wso2carbon".to_owned(),
            trust_store_alias: "testprod3".to_owned(),
            certificate_text_file: "opensslcert.txt".to_owned(),
        }
    }
}

/// 저장 디렉토리 설정 (작업 디렉토리 기준)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// 로그 보관 디렉토리
    pub log_dir: String,
    /// 제품 배포본 보관 디렉토리
    pub product_dir: String,
    /// 단계별 실행 보고서 파일 이름 (로그 보관 디렉토리 안)
    pub report_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_owned(),
            product_dir: "storage".to_owned(),
            report_file: "run-report.json".to_owned(),
        }
    }
}

/// 소스 획득 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// 클론 후 최신 태그로 고정할지 여부
    pub pin_latest_tag: bool,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::EnvironmentStep;

    #[test]
    fn default_settings_match_original_constants() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.inputs.test_plan_file, "testplan-props.properties");
        assert_eq!(settings.inputs.infra_file, "infrastructure.properties");
        assert_eq!(settings.inputs.output_file, "output.properties");
        assert_eq!(settings.tools.build, "mvn");
        assert_eq!(settings.environment.hosts_file, "/etc/hosts");
        assert_eq!(settings.environment.trust_store_alias, "testprod3");
        assert_eq!(settings.storage.log_dir, "logs");
        assert!(!settings.source.pin_latest_tag);
    }

    #[test]
    fn default_settings_pass_validation() {
        RunnerSettings::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let settings = RunnerSettings::parse("").unwrap();
        assert_eq!(settings.general.log_level, "info");
        assert_eq!(settings.tools.git, "git");
    }

    #[test]
    fn partial_toml_merges_with_defaults() {
        let settings = RunnerSettings::parse(
            r#"
[tools]
build = "./mvnw"

[source]
pin_latest_tag = true
"#,
        )
        .unwrap();
        assert_eq!(settings.tools.build, "./mvnw");
        assert_eq!(settings.tools.git, "git");
        assert!(settings.source.pin_latest_tag);
    }

    #[test]
    fn invalid_toml_returns_parse_error() {
        let err = RunnerSettings::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            IntgError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut settings = RunnerSettings::default();
        settings.general.log_level = "verbose".to_owned();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_empty_tool() {
        let mut settings = RunnerSettings::default();
        settings.tools.keytool = " ".to_owned();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("tools.keytool"));
    }

    #[test]
    fn validate_rejects_empty_integration_module() {
        let settings = RunnerSettings::parse(
            r#"
[products.sample-product]
integration_module = ""
"#,
        )
        .unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("products.sample-product.integration_module"));
    }

    #[test]
    fn profile_lookup_prefers_settings_then_builtin() {
        let settings = RunnerSettings::parse(
            r#"
[products.sample-product]
environment_steps = ["bind-host"]
"#,
        )
        .unwrap();

        let configured = settings.profile(&ProductId::from("sample-product"));
        assert_eq!(configured.environment_steps, vec![EnvironmentStep::BindHost]);

        let builtin = settings.profile(&ProductId::from("product-apim"));
        assert!(builtin.has_step(EnvironmentStep::RewriteTopology));

        let fallback = settings.profile(&ProductId::from("other-product"));
        assert_eq!(fallback, ProductProfile::default());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_INTG_STR", "overridden") };
        override_string(&mut val, "TEST_INTG_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_INTG_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_INTG_BOOL_BAD", "yes-please") };
        override_bool(&mut val, "TEST_INTG_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_INTG_BOOL_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_INTG_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn settings_serialize_roundtrip() {
        let settings = RunnerSettings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed = RunnerSettings::parse(&toml_str).unwrap();
        assert_eq!(settings.tools.openssl, parsed.tools.openssl);
        assert_eq!(settings.storage.report_file, parsed.storage.report_file);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = RunnerSettings::from_file("/nonexistent/path/intg-runner.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IntgError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn load_or_default_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RunnerSettings::load_or_default(dir.path().join("missing.toml"))
            .await
            .unwrap();
        assert_eq!(settings.inputs.output_file, "output.properties");
    }
}
