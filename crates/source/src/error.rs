//! 소스 단계 에러 타입
//!
//! [`SourceError`]는 저장소 클론, 태그 고정, 배포 디스크립터 해석 중
//! 발생하는 에러를 표현합니다. `From<SourceError> for IntgError` 변환으로
//! 실행기까지 `?` 연산자로 전파됩니다.

use intg_core::error::{ExternalToolError, IntgError, ResourceError};

/// 소스 단계 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 버전 관리 클라이언트 실행 실패
    #[error("git error: {0}")]
    Git(#[from] ExternalToolError),

    /// 브랜치에서 도달 가능한 태그가 없음
    #[error("no tag reachable from the checked-out branch of '{product}'")]
    NoReachableTag {
        /// 실행한 프로그램
        program: String,
        /// 제품 식별자
        product: String,
    },

    /// 배포 디스크립터 파일 없음
    #[error("build descriptor not found: {path}")]
    DescriptorNotFound {
        /// 디스크립터 경로
        path: String,
    },

    /// 배포 디스크립터 구조 오류
    #[error("invalid build descriptor {path}: {reason}")]
    DescriptorParse {
        /// 디스크립터 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 시스템 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SourceError> for IntgError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Git(e) => IntgError::ExternalTool(e),
            SourceError::NoReachableTag { program, product } => {
                IntgError::ExternalTool(ExternalToolError::InvalidOutput {
                    program,
                    reason: format!("no tag reachable in '{product}'"),
                })
            }
            SourceError::DescriptorNotFound { path } => {
                IntgError::Resource(ResourceError::NotFound { path })
            }
            SourceError::DescriptorParse { path, reason } => {
                IntgError::Resource(ResourceError::DescriptorParse { path, reason })
            }
            SourceError::Io(e) => IntgError::Io(e),
        }
    }
}
