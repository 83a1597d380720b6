//! 빌드 도구 호출
//!
//! 모든 빌드는 모듈 디렉토리에서 배치 모드 `clean install`로 실행되며,
//! 전송 진행 로그는 `warn`으로 낮춥니다. 도구가 끝날 때까지 대기하고
//! 출력은 그대로 콘솔로 전달됩니다.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use intg_core::process::{ProcessRunner, ToolInvocation};

use crate::error::BuildError;

/// 모든 빌드에 전달되는 인자 (추가 플래그 앞)
pub const BUILD_ARGS: [&str; 4] = [
    "clean",
    "install",
    "-B",
    "-Dorg.slf4j.simpleLogger.log.org.apache.maven.cli.transfer.Slf4jMavenTransferListener=warn",
];

/// 빌드 도구 실행기
pub struct BuildRunner<P: ProcessRunner> {
    runner: Arc<P>,
    program: String,
}

impl<P: ProcessRunner> BuildRunner<P> {
    pub fn new(runner: Arc<P>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// `module`을 빌드합니다. `extra_flag`가 있으면 마지막 인자로 붙입니다.
    ///
    /// # Errors
    /// - 모듈 디렉토리가 없으면 `BuildError::ModuleNotFound`
    /// - 빌드 도구를 시작할 수 없거나 0이 아닌 코드로 끝나면 `BuildError::Tool`
    pub async fn build(&self, module: &Path, extra_flag: Option<&str>) -> Result<(), BuildError> {
        if !tokio::fs::try_exists(module).await? {
            return Err(BuildError::ModuleNotFound {
                path: module.display().to_string(),
            });
        }

        let invocation = ToolInvocation::new(&self.program)
            .args(BUILD_ARGS)
            .args(extra_flag)
            .current_dir(module);

        info!(module = %module.display(), flag = ?extra_flag, "start building a module");
        self.runner.run_checked(&invocation).await?;
        info!(module = %module.display(), "module build is completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use intg_core::process::MockProcessRunner;

    use super::*;

    const BASE: &str = "mvn clean install -B -Dorg.slf4j.simpleLogger.log.org.apache.maven.cli.transfer.Slf4jMavenTransferListener=warn";

    #[tokio::test]
    async fn build_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockProcessRunner::new());
        let builder = BuildRunner::new(Arc::clone(&runner), "mvn");

        builder.build(dir.path(), None).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to_string(), BASE);
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn build_with_flag_appends_it_last() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockProcessRunner::new());
        let builder = BuildRunner::new(Arc::clone(&runner), "mvn");

        builder.build(dir.path(), Some("-DplatformTests")).await.unwrap();

        assert_eq!(runner.command_lines(), vec![format!("{BASE} -DplatformTests")]);
    }

    #[tokio::test]
    async fn failing_build_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockProcessRunner::new().fail("mvn", Some("clean"), 1));
        let builder = BuildRunner::new(runner, "mvn");

        let err = builder.build(dir.path(), None).await.unwrap_err();
        assert!(matches!(err, BuildError::Tool(_)));
    }

    #[tokio::test]
    async fn missing_module_is_not_built() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockProcessRunner::new());
        let builder = BuildRunner::new(Arc::clone(&runner), "mvn");

        let err = builder
            .build(&dir.path().join("modules/missing"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::ModuleNotFound { .. }));
        assert!(runner.calls().is_empty());
    }
}
