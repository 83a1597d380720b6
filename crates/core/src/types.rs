//! 도메인 타입 -- 단계 간에 전달되는 공통 값
//!
//! 실행 설정에서 파생되거나 단계가 생성하는 값들을 정의합니다.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 제품 식별자
///
/// 저장소 URL의 마지막 경로 조각에서 확장자를 제거한 값입니다.
/// 예: `https://example.com/org/sample-product.git` → `sample-product`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// 저장소 URL에서 제품 식별자를 파생합니다.
    ///
    /// 마지막 조각이 비어 있거나 첫 `.` 앞부분이 비어 있으면 `None`을 반환합니다.
    pub fn from_repository_url(url: &str) -> Option<Self> {
        let last_segment = url.rsplit('/').next()?;
        let stem = last_segment.split('.').next()?.trim();
        if stem.is_empty() {
            None
        } else {
            Some(Self(stem.to_owned()))
        }
    }

    /// 문자열로 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// 테스트 모드
///
/// `DEBUG`이면 작업 디렉토리의 대체 테스트 디스크립터를 소스 트리로 옮깁니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TestMode {
    /// 기본 모드
    #[default]
    Normal,
    /// 대체 테스트 디스크립터 사용
    Debug,
}

impl FromStr for TestMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "DEBUG" { Self::Debug } else { Self::Normal })
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Debug => write!(f, "DEBUG"),
        }
    }
}

/// 배포 산출물 식별 정보
///
/// 빌드 디스크립터의 artifactId와 parent version에서 계산됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionIdentity {
    /// artifactId
    pub artifact_id: String,
    /// parent/version
    pub version: String,
}

impl DistributionIdentity {
    /// 압축 파일 확장자
    pub const ARCHIVE_EXTENSION: &'static str = ".zip";

    /// artifactId와 version이 모두 비어 있지 않을 때만 생성됩니다.
    pub fn new(artifact_id: impl Into<String>, version: impl Into<String>) -> Option<Self> {
        let artifact_id = artifact_id.into().trim().to_owned();
        let version = version.into().trim().to_owned();
        if artifact_id.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self {
            artifact_id,
            version,
        })
    }

    /// `artifactId-version`
    pub fn name(&self) -> String {
        format!("{}-{}", self.artifact_id, self.version)
    }

    /// `artifactId-version.zip`
    pub fn archive_name(&self) -> String {
        format!("{}{}", self.name(), Self::ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for DistributionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// 브랜치 끝에서 도달 가능한 최신 태그
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedTag(String);

impl ResolvedTag {
    /// 빈 태그는 허용하지 않습니다.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into().trim().to_owned();
        if name.is_empty() { None } else { Some(Self(name)) }
    }

    /// 태그 이름
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 호스트 파일에 기록되는 (호스트명, IP) 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostBinding {
    /// 호스트명
    pub hostname: String,
    /// IP 주소
    pub ip: IpAddr,
}

impl HostBinding {
    /// 호스트 파일 한 줄 (`<ip> <hostname>`)
    pub fn entry_line(&self) -> String {
        format!("{} {}", self.ip, self.hostname)
    }
}

/// 실행 요약 -- 알림 시스템 등 후속 소비자를 위한 출력
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// `<repo-url>/tree/<branch>`
    pub git_location: String,
    /// 해석된 태그 (없으면 빈 문자열)
    pub git_revision: String,
}

impl RunSummary {
    /// 저장소 URL, 브랜치, 해석된 리비전으로 요약을 만듭니다.
    pub fn new(repository_url: &str, branch: &str, revision: Option<&ResolvedTag>) -> Self {
        Self {
            git_location: format!("{repository_url}/tree/{branch}"),
            git_revision: revision.map(|t| t.as_str().to_owned()).unwrap_or_default(),
        }
    }

    /// `KEY=VALUE` 형식(CRLF 종료)으로 직렬화합니다.
    pub fn to_properties(&self) -> String {
        format!(
            "GIT_LOCATION={}\r\nGIT_REVISION={}\r\n",
            self.git_location, self.git_revision
        )
    }
}
