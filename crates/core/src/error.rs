//! 에러 타입 -- 실행 단계별 에러 분류
//!
//! [`IntgError`]는 모든 단계가 최종적으로 전파하는 최상위 에러입니다.
//! [`IntgError::category`]로 설정/외부 도구/리소스 접근 분류를 얻고,
//! 실행기는 이 분류를 프로세스 종료 코드로 변환합니다.

use std::fmt;

/// intg-runner 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IntgError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 외부 도구 실행 에러
    #[error("external tool error: {0}")]
    ExternalTool(#[from] ExternalToolError),

    /// 리소스 접근 에러
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntgError {
    /// 에러 분류를 반환합니다.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::ExternalTool(_) => ErrorCategory::ExternalTool,
            Self::Resource(_) => ErrorCategory::ResourceAccess,
            Self::Io(_) => ErrorCategory::Io,
        }
    }
}

/// 에러 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 속성 파일 누락, 필수 값 누락, 잘못된 설정 값
    Configuration,
    /// git, mvn, openssl, keytool 등 외부 도구 실패
    ExternalTool,
    /// 빌드 디스크립터, 템플릿, 로그 파일 등 리소스 접근 실패
    ResourceAccess,
    /// 분류되지 않은 I/O 실패
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::ExternalTool => write!(f, "external-tool"),
            Self::ResourceAccess => write!(f, "resource-access"),
            Self::Io => write!(f, "io"),
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일 또는 속성 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 필수 값 누락 (누락된 모든 키를 한 번에 보고)
    #[error("missing mandatory values:{}", format_missing(.missing))]
    MissingValues { missing: Vec<String> },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

fn format_missing(missing: &[String]) -> String {
    missing.iter().map(|key| format!(" -{key}-")).collect()
}

/// 외부 도구 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ExternalToolError {
    /// 프로세스 생성 실패 (바이너리 없음, 권한 등)
    #[error("failed to spawn '{program}': {reason}")]
    Spawn { program: String, reason: String },

    /// 0이 아닌 종료 코드
    #[error("'{program}' exited with {}{}", format_code(.code), format_stderr(.stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 출력 처리 실패
    #[error("unexpected output from '{program}': {reason}")]
    InvalidOutput { program: String, reason: String },
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_owned(),
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// 리소스 접근 에러
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// 파일을 찾을 수 없음
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// 빌드 디스크립터 파싱 실패
    #[error("failed to parse build descriptor {path}: {reason}")]
    DescriptorParse { path: String, reason: String },

    /// 토폴로지 템플릿 재작성 실패
    #[error("failed to rewrite topology template {path}: {reason}")]
    TemplateRewrite { path: String, reason: String },
}
