//! 빌드 단계 에러 타입
//!
//! [`BuildError`]는 빌드 도구 실행, 테스트 디스크립터 교체, 로그/요약/보고서
//! 기록 중 발생하는 에러를 표현하며 `IntgError`로 변환됩니다.

use intg_core::error::{ExternalToolError, IntgError, ResourceError};

/// 빌드 단계 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 빌드 도구 실행 실패
    #[error("build tool error: {0}")]
    Tool(#[from] ExternalToolError),

    /// 빌드할 모듈 디렉토리 없음
    #[error("module not found: {path}")]
    ModuleNotFound {
        /// 모듈 경로
        path: String,
    },

    /// DEBUG 모드 대체 디스크립터 없음
    #[error("debug resource not found: {path}")]
    DebugResourceNotFound {
        /// 원본 파일 경로
        path: String,
    },

    /// 실행 보고서 직렬화 실패
    #[error("failed to serialize run report: {0}")]
    Report(#[from] serde_json::Error),

    /// 파일 시스템 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BuildError> for IntgError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Tool(e) => IntgError::ExternalTool(e),
            BuildError::ModuleNotFound { path } | BuildError::DebugResourceNotFound { path } => {
                IntgError::Resource(ResourceError::NotFound { path })
            }
            BuildError::Report(e) => IntgError::Io(std::io::Error::other(e)),
            BuildError::Io(e) => IntgError::Io(e),
        }
    }
}
