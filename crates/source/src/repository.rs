//! 저장소 관리 -- 제품 소스 클론 및 릴리스 태그 고정
//!
//! [`RepositoryManager`]는 버전 관리 클라이언트를 [`ProcessRunner`]를 통해
//! 호출합니다. 모든 인자는 벡터로 전달되며 셸을 거치지 않습니다.
//!
//! 소스 트리는 항상 `<workspace>/<product-id>`에 위치합니다.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use intg_core::process::{ProcessRunner, ToolInvocation};
use intg_core::properties::RunConfiguration;
use intg_core::types::{ProductId, ResolvedTag};
use intg_core::workspace::Workspace;

use crate::error::SourceError;

/// 제품 저장소 관리자
pub struct RepositoryManager<P: ProcessRunner> {
    /// 외부 프로세스 실행기
    runner: Arc<P>,
    /// 버전 관리 클라이언트 프로그램
    git: String,
    /// 작업 디렉토리
    workspace: Workspace,
}

impl<P: ProcessRunner> RepositoryManager<P> {
    /// 새 저장소 관리자를 생성합니다.
    pub fn new(runner: Arc<P>, git: impl Into<String>, workspace: Workspace) -> Self {
        Self {
            runner,
            git: git.into(),
            workspace,
        }
    }

    /// 설정된 브랜치로 저장소를 작업 디렉토리에 클론합니다.
    ///
    /// `git clone --branch <branch> <url>`, cwd = workspace
    ///
    /// # Returns
    /// 클론된 소스 트리 경로 (`<workspace>/<product-id>`)
    pub async fn clone_repository(
        &self,
        config: &RunConfiguration,
    ) -> Result<PathBuf, SourceError> {
        let invocation = ToolInvocation::new(&self.git)
            .args(["clone", "--branch", config.branch(), config.repository_url()])
            .current_dir(self.workspace.root());

        info!(
            url = config.repository_url(),
            branch = config.branch(),
            "cloning product repository"
        );
        self.runner.run_checked(&invocation).await?;

        let source_dir = self.workspace.source_dir(config.product_id());
        info!(path = %source_dir.display(), "product repository cloned");
        Ok(source_dir)
    }

    /// 소스 트리를 주어진 태그로 전환합니다.
    ///
    /// `git fetch origin tags/<tag>` 후 `git checkout -B tags/<tag> <tag>`
    pub async fn checkout_tag(
        &self,
        product: &ProductId,
        tag: &ResolvedTag,
    ) -> Result<(), SourceError> {
        let source_dir = self.workspace.source_dir(product);
        let tag_ref = format!("tags/{tag}");

        let fetch = ToolInvocation::new(&self.git)
            .args(["fetch", "origin", tag_ref.as_str()])
            .current_dir(&source_dir);
        self.runner.run_checked(&fetch).await?;

        let checkout = ToolInvocation::new(&self.git)
            .args(["checkout", "-B", tag_ref.as_str(), tag.as_str()])
            .current_dir(&source_dir);
        self.runner.run_checked(&checkout).await?;

        info!(product = %product, tag = %tag, "checked out release tag");
        Ok(())
    }

    /// 브랜치 끝에서 도달 가능한 가장 최근 태그를 찾습니다.
    ///
    /// `git describe --abbrev=0 --tags`의 출력(앞뒤 공백 제거)
    pub async fn resolve_latest_tag(&self, product: &ProductId) -> Result<ResolvedTag, SourceError> {
        let invocation = ToolInvocation::new(&self.git)
            .args(["describe", "--abbrev=0", "--tags"])
            .current_dir(self.workspace.source_dir(product))
            .capture_output();

        let output = self.runner.run_checked(&invocation).await?;
        let tag = ResolvedTag::new(output.stdout_text()).ok_or_else(|| {
            SourceError::NoReachableTag {
                program: self.git.clone(),
                product: product.to_string(),
            }
        })?;

        info!(product = %product, tag = %tag, "latest tag resolved");
        Ok(tag)
    }

    /// 최신 태그를 찾아 소스 트리를 해당 태그로 고정합니다.
    pub async fn pin_latest_tag(&self, product: &ProductId) -> Result<ResolvedTag, SourceError> {
        let tag = self.resolve_latest_tag(product).await?;
        self.checkout_tag(product, &tag).await?;
        Ok(tag)
    }
}
