//! 실행 속성 -- 실행을 결정하는 두 개의 `KEY=VALUE` 파일
//!
//! 테스트 계획 파일, 인프라 파일 순으로 읽습니다. 두 파일에 걸쳐
//! 나중에 나온 키가 앞의 값을 덮어씁니다. `#`으로 시작하는 줄은 주석이며
//! 알 수 없는 키는 무시합니다.
//!
//! 파싱 후 [`RunProperties::into_configuration`]이 모든 필수 값을 한 번에
//! 검사하고, 누락된 키 전체를 하나의 [`ConfigError::MissingValues`]로
//! 보고합니다.

use std::net::IpAddr;

use tracing::{debug, info};

use crate::config::InputSettings;
use crate::error::{ConfigError, IntgError};
use crate::types::{ProductId, TestMode};
use crate::workspace::Workspace;

pub const KEY_GIT_URL: &str = "PRODUCT_GIT_URL";
pub const KEY_GIT_BRANCH: &str = "PRODUCT_GIT_BRANCH";
pub const KEY_TEST_MODE: &str = "TEST_MODE";
pub const KEY_HOST: &str = "PRODUCT_HOST";
pub const KEY_PORT: &str = "PRODUCT_PORT";
pub const KEY_IP: &str = "PRODUCT_IP";

/// URL은 있으나 제품 식별자를 파생할 수 없을 때 보고되는 이름
pub const DERIVED_PRODUCT_ID: &str = "product-id";

/// 검증 전의 인식된 원시 값
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    pub git_url: Option<String>,
    pub git_branch: Option<String>,
    pub test_mode: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub ip: Option<String>,
}

impl RunProperties {
    /// 속성 파일 하나의 내용을 파싱합니다.
    pub fn parse(content: &str) -> Self {
        let mut props = Self::default();
        props.merge(content);
        props
    }

    /// `content`의 줄들을 현재 값 위에 적용합니다.
    pub fn merge(&mut self, content: &str) {
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                debug!(line = trimmed, "skipping property line without '='");
                continue;
            };
            let value = value.trim();
            match key.trim() {
                KEY_GIT_URL => self.git_url = Some(value.replace('\\', "")),
                KEY_GIT_BRANCH => self.git_branch = Some(value.to_owned()),
                KEY_TEST_MODE => self.test_mode = Some(value.to_owned()),
                KEY_HOST => self.host = Some(value.to_owned()),
                KEY_PORT => self.port = Some(value.to_owned()),
                KEY_IP => self.ip = Some(value.to_owned()),
                _ => {}
            }
        }
    }

    /// 저장소 URL에서 파생한 제품 식별자
    pub fn product_id(&self) -> Option<ProductId> {
        self.git_url
            .as_deref()
            .and_then(ProductId::from_repository_url)
    }

    /// 없거나 비어 있는 필수 이름 (각각 한 번씩)
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let absent = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);

        if absent(&self.git_url) {
            missing.push(KEY_GIT_URL);
        } else if self.product_id().is_none() {
            missing.push(DERIVED_PRODUCT_ID);
        }
        if absent(&self.git_branch) {
            missing.push(KEY_GIT_BRANCH);
        }
        if absent(&self.test_mode) {
            missing.push(KEY_TEST_MODE);
        }
        if absent(&self.host) {
            missing.push(KEY_HOST);
        }
        if absent(&self.port) {
            missing.push(KEY_PORT);
        }
        if absent(&self.ip) {
            missing.push(KEY_IP);
        }
        missing
    }

    /// 값을 검증하여 [`RunConfiguration`]으로 고정합니다.
    ///
    /// # Errors
    /// - 누락된 키 전체를 담은 `ConfigError::MissingValues`
    /// - 파싱할 수 없는 포트나 IP는 `ConfigError::InvalidValue`
    pub fn into_configuration(self) -> Result<RunConfiguration, ConfigError> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(ConfigError::MissingValues {
                missing: missing.into_iter().map(str::to_owned).collect(),
            });
        }

        let Some(product_id) = self.product_id() else {
            return Err(ConfigError::MissingValues {
                missing: vec![DERIVED_PRODUCT_ID.to_owned()],
            });
        };
        // 모든 필드의 존재는 위에서 확인됨
        let repository_url = self.git_url.unwrap_or_default();
        let branch = self.git_branch.unwrap_or_default();
        let test_mode = self.test_mode.unwrap_or_default();
        let host = self.host.unwrap_or_default();
        let port = self.port.unwrap_or_default();
        let ip = self.ip.unwrap_or_default();

        let port = port.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
            field: KEY_PORT.to_owned(),
            reason: format!("'{port}' is not a valid port: {e}"),
        })?;
        let ip = ip.parse::<IpAddr>().map_err(|e| ConfigError::InvalidValue {
            field: KEY_IP.to_owned(),
            reason: format!("'{ip}' is not a valid ip address: {e}"),
        })?;
        let test_mode = test_mode.parse::<TestMode>().unwrap_or_default();

        Ok(RunConfiguration {
            repository_url,
            branch,
            test_mode,
            host,
            port,
            ip,
            product_id,
        })
    }
}

/// 실행 한 번의 불변 설정
///
/// [`load_run_configuration`]이 한 번 만들고 모든 단계에 참조로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    repository_url: String,
    branch: String,
    test_mode: TestMode,
    host: String,
    port: u16,
    ip: IpAddr,
    product_id: ProductId,
}

impl RunConfiguration {
    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn test_mode(&self) -> TestMode {
        self.test_mode
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }
}

/// 작업 디렉토리에서 두 속성 파일을 읽고 결과를 검증합니다.
///
/// 어느 파일이든 읽기 전에 두 파일이 모두 있어야 합니다.
///
/// # Errors
/// - 파일이 하나라도 없으면 `ConfigError::FileNotFound`
/// - 검증 실패 시 `ConfigError::MissingValues` / `ConfigError::InvalidValue`
/// - 그 밖의 읽기 실패는 `IntgError::Io`
pub async fn load_run_configuration(
    workspace: &Workspace,
    inputs: &InputSettings,
) -> Result<RunConfiguration, IntgError> {
    let paths = [
        workspace.path(&inputs.test_plan_file),
        workspace.path(&inputs.infra_file),
    ];

    for path in &paths {
        if !tokio::fs::try_exists(path).await? {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
    }

    let mut props = RunProperties::default();
    for path in &paths {
        let content = tokio::fs::read_to_string(path).await?;
        props.merge(&content);
        debug!(path = %path.display(), "property file read");
    }

    let config = props.into_configuration()?;
    info!(
        product = %config.product_id(),
        branch = config.branch(),
        host = config.host(),
        port = config.port(),
        test_mode = %config.test_mode(),
        "run configuration loaded"
    );
    Ok(config)
}
