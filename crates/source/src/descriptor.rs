//! 배포 디스크립터 해석 -- 빌드 디스크립터에서 배포 식별 정보 추출
//!
//! 제품의 배포 모듈 `pom.xml`에서 `project/artifactId`와
//! `project/parent/version`을 읽어 [`DistributionIdentity`]를 만듭니다.
//! 요소는 Maven POM 네임스페이스([`POM_NAMESPACE`])에 속한 것만 인정합니다.
//!
//! # 처리 흐름
//! ```text
//! <workspace>/<product>/<distribution_pom>
//!     --> NsReader (namespace resolved events)
//!     --> element path tracking (project / parent / version)
//!     --> DistributionIdentity { artifact_id, version }
//! ```

use std::io::ErrorKind;
use std::path::PathBuf;

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, info};

use intg_core::types::{DistributionIdentity, ProductId};
use intg_core::workspace::Workspace;

use crate::error::SourceError;

/// Maven POM 네임스페이스
pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

const ARTIFACT_ID_PATH: [&str; 2] = ["project", "artifactId"];
const PARENT_VERSION_PATH: [&str; 3] = ["project", "parent", "version"];

/// 배포 식별 정보 해석기
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    workspace: Workspace,
}

impl ArtifactResolver {
    /// 새 해석기를 생성합니다.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// 제품의 배포 디스크립터를 읽어 식별 정보를 반환합니다.
    ///
    /// # Arguments
    /// - `product`: 제품 식별자 (소스 트리 디렉토리 이름)
    /// - `descriptor`: 소스 트리 기준 디스크립터 상대 경로
    ///
    /// # Errors
    /// - 파일이 없으면 `SourceError::DescriptorNotFound`
    /// - 구조가 맞지 않으면 `SourceError::DescriptorParse`
    pub async fn resolve(
        &self,
        product: &ProductId,
        descriptor: &str,
    ) -> Result<DistributionIdentity, SourceError> {
        let path = self.workspace.source_path(product, descriptor);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::DescriptorNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let identity =
            parse_descriptor(&content).map_err(|reason| SourceError::DescriptorParse {
                path: path.display().to_string(),
                reason,
            })?;

        info!(
            product = %product,
            distribution = %identity,
            archive = %identity.archive_name(),
            "distribution identity resolved"
        );
        Ok(identity)
    }

    /// 제품 저장 디렉토리 안의 배포 아카이브 경로를 반환합니다.
    ///
    /// 저장 디렉토리가 없으면 생성합니다.
    pub async fn archive_path(
        &self,
        storage_dir: &str,
        identity: &DistributionIdentity,
    ) -> Result<PathBuf, SourceError> {
        let dir = self.workspace.path(storage_dir);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir.join(identity.archive_name()))
    }
}

/// 디스크립터 문서에서 배포 식별 정보를 추출합니다.
///
/// 실패 시 사유 문자열을 반환합니다.
pub fn parse_descriptor(content: &str) -> Result<DistributionIdentity, String> {
    let mut reader = NsReader::from_str(content);
    reader.config_mut().trim_text(true);

    // POM 네임스페이스 밖의 요소는 빈 이름으로 기록되어 경로 매칭에서 제외된다
    let mut path: Vec<String> = Vec::new();
    let mut artifact_id: Option<String> = None;
    let mut version: Option<String> = None;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let name = match ns {
                    ResolveResult::Bound(Namespace(uri)) if uri == POM_NAMESPACE.as_bytes() => {
                        String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
                    }
                    _ => String::new(),
                };
                if path.is_empty() && name != "project" {
                    return Err(format!(
                        "root element is not a <project> in namespace {POM_NAMESPACE}"
                    ));
                }
                path.push(name);
            }
            Ok((_, Event::End(_))) => {
                path.pop();
            }
            Ok((_, Event::Text(t))) => {
                let text = t.unescape().map_err(|e| format!("invalid text: {e}"))?;
                if artifact_id.is_none() && path == ARTIFACT_ID_PATH {
                    artifact_id = Some(text.into_owned());
                } else if version.is_none() && path == PARENT_VERSION_PATH {
                    version = Some(text.into_owned());
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("malformed XML: {e}")),
        }
    }

    let artifact_id = artifact_id.ok_or_else(|| "missing project/artifactId".to_owned())?;
    let version = version.ok_or_else(|| "missing project/parent/version".to_owned())?;
    debug!(artifact_id = %artifact_id, version = %version, "descriptor parsed");

    DistributionIdentity::new(artifact_id, version)
        .ok_or_else(|| "artifactId and version must not be empty".to_owned())
}
