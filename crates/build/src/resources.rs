//! DEBUG 모드 테스트 디스크립터 교체
//!
//! 작업 디렉토리에 놓인 대체 디스크립터(`testng.xml` 등)를
//! 소스 트리의 테스트 리소스 위치로 이동합니다. 기존 파일은 덮어씁니다.
//! 파일 시스템 경계를 넘는 이동은 복사 후 원본 삭제로 처리합니다.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use intg_core::profile::DebugResource;
use intg_core::types::ProductId;
use intg_core::workspace::Workspace;

use crate::error::BuildError;

/// 프로파일의 대체 디스크립터를 모두 소스 트리로 이동합니다.
///
/// 하나라도 원본이 없으면 이동 전에 실패합니다.
///
/// # Returns
/// 이동된 파일의 대상 경로 목록
pub async fn substitute_debug_resources(
    workspace: &Workspace,
    product: &ProductId,
    resources: &[DebugResource],
) -> Result<Vec<PathBuf>, BuildError> {
    let moves: Vec<(PathBuf, PathBuf)> = resources
        .iter()
        .map(|r| {
            (
                workspace.path(&r.source),
                workspace.source_path(product, &r.destination),
            )
        })
        .collect();

    for (source, _) in &moves {
        if !tokio::fs::try_exists(source).await? {
            return Err(BuildError::DebugResourceNotFound {
                path: source.display().to_string(),
            });
        }
    }

    let mut moved = Vec::with_capacity(moves.len());
    for (source, destination) in moves {
        move_file(&source, &destination).await?;
        info!(
            from = %source.display(),
            to = %destination.display(),
            "test descriptor replaced"
        );
        moved.push(destination);
    }
    Ok(moved)
}

async fn move_file(source: &Path, destination: &Path) -> Result<(), BuildError> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Err(e) = tokio::fs::rename(source, destination).await {
        debug!(error = %e, "rename failed, falling back to copy");
        tokio::fs::copy(source, destination).await?;
        tokio::fs::remove_file(source).await?;
    }
    Ok(())
}
