//! 통합 테스트 실행 -- 제품 프로파일에 따른 모듈 빌드와 플랫폼 테스트 모듈 실행
//!
//! [`TestOrchestrator`]는 환경 구성이 끝난 소스 트리에서
//! 사전 모듈(`pre_integration_modules`)과 통합 테스트 모듈
//! (`integration_module` + `integration_flag`)을 빌드합니다.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use intg_core::process::ProcessRunner;
use intg_core::profile::ProductProfile;
use intg_core::types::ProductId;
use intg_core::workspace::Workspace;

use crate::error::BuildError;
use crate::maven::BuildRunner;

/// 통합 테스트 실행기
pub struct TestOrchestrator<P: ProcessRunner> {
    builder: BuildRunner<P>,
    workspace: Workspace,
}

impl<P: ProcessRunner> TestOrchestrator<P> {
    /// 새 실행기를 생성합니다.
    pub fn new(runner: Arc<P>, build_program: impl Into<String>, workspace: Workspace) -> Self {
        Self {
            builder: BuildRunner::new(runner, build_program),
            workspace,
        }
    }

    /// 소스 트리 기준 모듈 경로
    pub fn module_path(&self, product: &ProductId, module: &str) -> PathBuf {
        self.workspace.source_path(product, module)
    }

    /// 사전 모듈 하나를 빌드합니다 (추가 플래그 없음).
    pub async fn build_module(&self, product: &ProductId, module: &str) -> Result<(), BuildError> {
        self.builder
            .build(&self.module_path(product, module), None)
            .await
    }

    /// 통합 테스트 모듈을 프로파일의 플래그와 함께 빌드합니다.
    pub async fn run_integration_tests(
        &self,
        product: &ProductId,
        profile: &ProductProfile,
    ) -> Result<(), BuildError> {
        let module = self.module_path(product, &profile.integration_module);
        info!(
            product = %product,
            module = %module.display(),
            "running platform integration tests"
        );
        self.builder
            .build(&module, profile.integration_flag.as_deref())
            .await?;
        info!(product = %product, "platform integration tests finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use intg_core::process::MockProcessRunner;

    use super::*;

    #[tokio::test]
    async fn integration_module_runs_with_platform_flag() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::at(dir.path());
        let product = ProductId::from("sample-product");
        let module = workspace.source_path(&product, "modules/integration");
        std::fs::create_dir_all(&module).unwrap();

        let runner = Arc::new(MockProcessRunner::new());
        let orchestrator = TestOrchestrator::new(Arc::clone(&runner), "mvn", workspace);

        orchestrator
            .run_integration_tests(&product, &ProductProfile::default())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args.last().map(String::as_str), Some("-DplatformTests"));
        assert_eq!(calls[0].cwd.as_deref(), Some(module.as_path()));
    }

    #[tokio::test]
    async fn profile_without_flag_runs_plain_build() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::at(dir.path());
        let product = ProductId::from("sample-product");
        std::fs::create_dir_all(workspace.source_path(&product, "it")).unwrap();
        let profile = ProductProfile {
            integration_module: "it".to_owned(),
            integration_flag: None,
            ..ProductProfile::default()
        };

        let runner = Arc::new(MockProcessRunner::new());
        let orchestrator = TestOrchestrator::new(Arc::clone(&runner), "mvn", workspace);
        orchestrator
            .run_integration_tests(&product, &profile)
            .await
            .unwrap();

        assert!(!runner.calls()[0].args.iter().any(|a| a == "-DplatformTests"));
    }

    #[tokio::test]
    async fn pre_module_build_uses_source_tree() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::at(dir.path());
        let product = ProductId::from("product-apim");
        let module = workspace.source_path(&product, "modules/api-import-export");
        std::fs::create_dir_all(&module).unwrap();

        let runner = Arc::new(MockProcessRunner::new());
        let orchestrator = TestOrchestrator::new(Arc::clone(&runner), "mvn", workspace);
        orchestrator
            .build_module(&product, "modules/api-import-export")
            .await
            .unwrap();

        assert_eq!(runner.calls()[0].cwd.as_deref(), Some(module.as_path()));
    }
}
