//! 환경 구성 에러 타입
//!
//! [`EnvironmentError`]는 호스트 매핑, 인증서 등록, 토폴로지 재작성 중
//! 발생하는 에러를 표현하며 `IntgError`로 변환됩니다.

use intg_core::error::{ExternalToolError, IntgError, ResourceError};

/// 환경 구성 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// 외부 도구(openssl, keytool) 실행 실패
    #[error("tool error: {0}")]
    Tool(#[from] ExternalToolError),

    /// 호스트 파일 읽기/쓰기 실패
    #[error("hosts file {path}: {source}")]
    HostsFile {
        /// 호스트 파일 경로
        path: String,
        /// 원인
        source: std::io::Error,
    },

    /// 대상 호스트가 인증서를 제시하지 않음
    #[error("no certificate presented by {host}:{port}")]
    NoCertificate {
        /// TLS 도구
        program: String,
        /// 대상 호스트
        host: String,
        /// 대상 포트
        port: u16,
    },

    /// 인증서 디렉토리 없음
    #[error("certificate directory not found: {path}")]
    CertificateDirNotFound {
        /// 디렉토리 경로
        path: String,
    },

    /// 토폴로지 템플릿 파일 없음
    #[error("topology template not found: {path}")]
    TemplateNotFound {
        /// 템플릿 경로
        path: String,
    },

    /// 토폴로지 템플릿 재작성 실패
    #[error("failed to rewrite topology template {path}: {reason}")]
    TemplateRewrite {
        /// 템플릿 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 시스템 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EnvironmentError> for IntgError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::Tool(e) => IntgError::ExternalTool(e),
            EnvironmentError::HostsFile { path, source } => {
                IntgError::Io(std::io::Error::new(source.kind(), format!("{path}: {source}")))
            }
            EnvironmentError::NoCertificate {
                program,
                host,
                port,
            } => IntgError::ExternalTool(ExternalToolError::InvalidOutput {
                program,
                reason: format!("no certificate presented by {host}:{port}"),
            }),
            EnvironmentError::CertificateDirNotFound { path }
            | EnvironmentError::TemplateNotFound { path } => {
                IntgError::Resource(ResourceError::NotFound { path })
            }
            EnvironmentError::TemplateRewrite { path, reason } => {
                IntgError::Resource(ResourceError::TemplateRewrite { path, reason })
            }
            EnvironmentError::Io(e) => IntgError::Io(e),
        }
    }
}
