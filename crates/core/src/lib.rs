//! intg-core: 통합 테스트 실행기의 공통 타입, 에러, 설정
//!
//! # Module Structure
//!
//! - [`error`]: 에러 분류 (`IntgError`, `ConfigError`, `ExternalToolError`, `ResourceError`)
//! - [`config`]: 실행기 설정 (`RunnerSettings`, `intg-runner.toml`)
//! - [`properties`]: 실행 속성 파일 로더 (`RunConfiguration`)
//! - [`profile`]: 제품 계열별 단계 구성 (`ProductProfile`)
//! - [`process`]: 외부 프로세스 추상화 (`ProcessRunner`)
//! - [`stage`]: 단계 식별과 실행 보고서 (`Stage`, `RunReport`)
//! - [`types`]: 도메인 타입
//! - [`workspace`]: 작업 디렉토리 경로

pub mod config;
pub mod error;
pub mod process;
pub mod profile;
pub mod properties;
pub mod stage;
pub mod types;
pub mod workspace;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ErrorCategory, ExternalToolError, IntgError, ResourceError};

// 설정
pub use config::RunnerSettings;
pub use properties::{RunConfiguration, RunProperties, load_run_configuration};
pub use profile::{DebugResource, EnvironmentStep, ProductProfile};

// 외부 프로세스
#[cfg(any(test, feature = "test-util"))]
pub use process::MockProcessRunner;
pub use process::{OutputMode, ProcessRunner, SystemProcessRunner, ToolInvocation, ToolOutput};

// 단계
pub use stage::{RunOutcome, RunReport, Stage, StageRecord, StageStatus};

// 도메인 타입
pub use types::{DistributionIdentity, HostBinding, ProductId, ResolvedTag, RunSummary, TestMode};
pub use workspace::Workspace;
