//! 제품 프로파일 -- 제품 계열별 단계 구성 테이블
//!
//! 제품 식별자마다 어떤 환경 구성 단계를 어떤 순서로 실행할지,
//! 어떤 모듈을 빌드하고 어떤 로그를 수집할지를 선언합니다.
//! 새 제품 계열은 분기 추가 없이 프로파일 항목 추가만으로 지원됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// 통합 테스트 리소스 디렉토리 (소스 트리 기준)
const TEST_RESOURCES_DIR: &str = "modules/integration/tests-integration/tests-backend/src/test/resources";

/// 환경 구성 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentStep {
    /// 호스트 파일에 호스트명 매핑 추가
    BindHost,
    /// 대상 호스트 인증서를 트러스트 스토어에 등록
    ImportCertificate,
    /// 플랫폼 테스트 토폴로지 템플릿 재작성
    RewriteTopology,
}

impl fmt::Display for EnvironmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindHost => write!(f, "bind-host"),
            Self::ImportCertificate => write!(f, "import-certificate"),
            Self::RewriteTopology => write!(f, "rewrite-topology"),
        }
    }
}

/// DEBUG 모드에서 작업 디렉토리 → 소스 트리로 옮길 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugResource {
    /// 작업 디렉토리 기준 원본 경로
    pub source: String,
    /// 소스 트리 기준 대상 경로
    pub destination: String,
}

/// 제품 프로파일
///
/// 모든 경로는 체크아웃된 소스 트리(`<workspace>/<product-id>`) 기준입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductProfile {
    /// 순서대로 실행할 환경 구성 단계
    pub environment_steps: Vec<EnvironmentStep>,
    /// 배포 모듈 빌드 디스크립터 (없으면 배포 식별 정보 해석 생략)
    pub distribution_pom: Option<String>,
    /// 통합 테스트 전에 빌드할 모듈
    pub pre_integration_modules: Vec<String>,
    /// 통합 테스트 모듈
    pub integration_module: String,
    /// 통합 테스트 빌드 플래그
    pub integration_flag: Option<String>,
    /// 트러스트 스토어 디렉토리
    pub certificate_dir: String,
    /// 토폴로지 템플릿 경로
    pub topology_template: String,
    /// 수집할 로그 파일
    pub log_files: Vec<String>,
    /// DEBUG 모드 대체 파일
    pub debug_resources: Vec<DebugResource>,
}

impl Default for ProductProfile {
    fn default() -> Self {
        Self {
            environment_steps: vec![EnvironmentStep::BindHost, EnvironmentStep::ImportCertificate],
            distribution_pom: None,
            pre_integration_modules: Vec::new(),
            integration_module: "modules/integration".to_owned(),
            integration_flag: Some("-DplatformTests".to_owned()),
            certificate_dir: format!("{TEST_RESOURCES_DIR}/keystores/products"),
            topology_template: format!("{TEST_RESOURCES_DIR}/platform-test-host-config.xsl"),
            log_files: Vec::new(),
            debug_resources: vec![
                DebugResource {
                    source: "testng.xml".to_owned(),
                    destination: format!("{TEST_RESOURCES_DIR}/testng.xml"),
                },
                DebugResource {
                    source: "testng-server-mgt.xml".to_owned(),
                    destination: format!("{TEST_RESOURCES_DIR}/testng-server-mgt.xml"),
                },
            ],
        }
    }
}

impl ProductProfile {
    /// 내장 프로파일을 반환합니다. 알려지지 않은 제품은 `None`.
    pub fn builtin(product: &ProductId) -> Option<Self> {
        match product.as_str() {
            "product-apim" => Some(Self {
                environment_steps: vec![
                    EnvironmentStep::BindHost,
                    EnvironmentStep::ImportCertificate,
                    EnvironmentStep::RewriteTopology,
                ],
                distribution_pom: Some("modules/distribution/product/pom.xml".to_owned()),
                pre_integration_modules: vec!["modules/api-import-export".to_owned()],
                log_files: vec![
                    "modules/integration/tests-integration/tests-backend/target/logs/automation.log"
                        .to_owned(),
                    "modules/integration/tests-integration/tests-backend/target/surefire-reports/TestSuite.txt"
                        .to_owned(),
                ],
                ..Self::default()
            }),
            _ => None,
        }
    }

    /// 주어진 단계가 포함되어 있는지 확인합니다.
    pub fn has_step(&self, step: EnvironmentStep) -> bool {
        self.environment_steps.contains(&step)
    }
}
