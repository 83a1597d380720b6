//! 산출물 보관 -- 로그 복사, 실행 요약 파일, 실행 보고서
//!
//! [`ArtifactCollector`]는 작업 디렉토리 기준의 고정 위치에 산출물을 남깁니다.
//!
//! - 로그: `<workspace>/<log_dir>/<file name>` (없는 파일은 기록 후 건너뜀)
//! - 요약: `<workspace>/<output_file>` (CRLF 줄 끝, 덮어쓰기)
//! - 보고서: `<workspace>/<log_dir>/<report_file>` (JSON)

use std::path::{Path, PathBuf};

use tracing::{error, info};

use intg_core::config::{InputSettings, StorageSettings};
use intg_core::properties::RunConfiguration;
use intg_core::stage::RunReport;
use intg_core::types::{ProductId, ResolvedTag, RunSummary};
use intg_core::workspace::Workspace;

use crate::error::BuildError;

/// 로그 수집 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedLogs {
    /// 복사된 파일 (보관 위치 기준)
    pub copied: Vec<PathBuf>,
    /// 소스 트리에 없던 파일
    pub missing: Vec<PathBuf>,
    /// 존재하지만 복사하지 못한 파일
    pub failed: Vec<PathBuf>,
}

impl CollectedLogs {
    /// 보관하지 못한 파일이 있는지 여부
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty() || !self.failed.is_empty()
    }
}

/// 산출물 보관기
#[derive(Debug, Clone)]
pub struct ArtifactCollector {
    workspace: Workspace,
    log_dir: PathBuf,
    output_file: PathBuf,
    report_file: String,
}

impl ArtifactCollector {
    /// 새 보관기를 생성합니다.
    pub fn new(workspace: Workspace, storage: &StorageSettings, inputs: &InputSettings) -> Self {
        Self {
            log_dir: workspace.path(&storage.log_dir),
            output_file: workspace.path(&inputs.output_file),
            report_file: storage.report_file.clone(),
            workspace,
        }
    }

    /// 로그 보관 디렉토리
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// 실행 요약 파일 경로
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// 실행 보고서 경로
    pub fn report_path(&self) -> PathBuf {
        self.log_dir.join(&self.report_file)
    }

    /// 제품 소스 트리의 로그 파일을 보관 디렉토리로 복사합니다.
    ///
    /// 보관 디렉토리가 없으면 생성합니다. 없는 파일이나 복사에 실패한
    /// 파일은 에러 로그를 남기고 다음 파일로 진행합니다. 보관 디렉토리
    /// 생성 실패만 에러로 반환됩니다.
    pub async fn collect_logs(
        &self,
        product: &ProductId,
        log_files: &[String],
    ) -> Result<CollectedLogs, BuildError> {
        tokio::fs::create_dir_all(&self.log_dir).await?;

        let mut collected = CollectedLogs::default();
        for file in log_files {
            let source = self.workspace.source_path(product, file);
            match tokio::fs::try_exists(&source).await {
                Ok(true) => {}
                Ok(false) => {
                    error!(path = %source.display(), "file doesn't exist in the given location");
                    collected.missing.push(source);
                    continue;
                }
                Err(e) => {
                    error!(path = %source.display(), error = %e, "failed to check log file");
                    collected.failed.push(source);
                    continue;
                }
            }

            let Some(name) = source.file_name() else {
                error!(path = %source.display(), "log path has no file name");
                collected.missing.push(source);
                continue;
            };
            let target = self.log_dir.join(name);
            if let Err(e) = tokio::fs::copy(&source, &target).await {
                error!(
                    from = %source.display(),
                    to = %target.display(),
                    error = %e,
                    "failed to copy log file"
                );
                collected.failed.push(source);
                continue;
            }
            info!(from = %source.display(), to = %target.display(), "log file saved");
            collected.copied.push(target);
        }
        Ok(collected)
    }

    /// 실행 요약 파일을 기록합니다.
    ///
    /// `revision`이 없으면 `GIT_REVISION`은 빈 값입니다.
    pub async fn write_summary(
        &self,
        config: &RunConfiguration,
        revision: Option<&ResolvedTag>,
    ) -> Result<RunSummary, BuildError> {
        let summary = RunSummary::new(config.repository_url(), config.branch(), revision);
        tokio::fs::write(&self.output_file, summary.to_properties()).await?;
        info!(
            path = %self.output_file.display(),
            git_location = %summary.git_location,
            git_revision = %summary.git_revision,
            "run summary written"
        );
        Ok(summary)
    }

    /// 실행 보고서를 JSON으로 기록합니다.
    pub async fn write_report(&self, report: &RunReport) -> Result<PathBuf, BuildError> {
        tokio::fs::create_dir_all(&self.log_dir).await?;
        let path = self.report_path();
        let json = report.to_json()?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), run_id = %report.run_id, "run report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use intg_core::properties::RunProperties;
    use intg_core::stage::{Stage, StageStatus};

    use super::*;

    fn collector(root: &Path) -> ArtifactCollector {
        ArtifactCollector::new(
            Workspace::at(root),
            &StorageSettings::default(),
            &InputSettings::default(),
        )
    }

    fn config() -> RunConfiguration {
        RunProperties::parse(
            "PRODUCT_GIT_URL=https://example.com/org/sample-product\n\
             PRODUCT_GIT_BRANCH=main\n\
             TEST_MODE=NORMAL\n\
             PRODUCT_HOST=test.local\n\
             PRODUCT_PORT=443\n\
             PRODUCT_IP=10.0.0.5\n",
        )
        .into_configuration()
        .unwrap()
    }

    #[tokio::test]
    async fn copies_existing_logs_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let c = collector(dir.path());
        let product = ProductId::from("sample-product");
        let present = "target/logs/automation.log";
        let source = Workspace::at(dir.path()).source_path(&product, present);
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "INFO run finished").unwrap();

        let collected = c
            .collect_logs(
                &product,
                &[present.to_owned(), "target/surefire-reports/TestSuite.txt".to_owned()],
            )
            .await
            .unwrap();

        assert_eq!(collected.copied, vec![dir.path().join("logs/automation.log")]);
        assert_eq!(collected.missing.len(), 1);
        assert!(collected.failed.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("logs/automation.log")).unwrap(),
            "INFO run finished"
        );
    }

    #[tokio::test]
    async fn uncopyable_entry_does_not_stop_later_logs() {
        let dir = tempfile::tempdir().unwrap();
        let c = collector(dir.path());
        let product = ProductId::from("sample-product");
        let workspace = Workspace::at(dir.path());
        // 디렉토리는 파일로 복사할 수 없다
        std::fs::create_dir_all(workspace.source_path(&product, "target/logs/automation.log"))
            .unwrap();
        std::fs::write(workspace.source_path(&product, "target/TestSuite.txt"), "Tests run: 4").unwrap();

        let collected = c
            .collect_logs(
                &product,
                &["target/logs/automation.log".to_owned(), "target/TestSuite.txt".to_owned()],
            )
            .await
            .expect("a single bad entry must not fail collection");

        assert_eq!(
            collected.failed,
            vec![workspace.source_path(&product, "target/logs/automation.log")]
        );
        assert!(collected.missing.is_empty());
        assert_eq!(collected.copied, vec![dir.path().join("logs/TestSuite.txt")]);
        assert!(collected.is_partial());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("logs/TestSuite.txt")).unwrap(),
            "Tests run: 4"
        );
    }

    #[tokio::test]
    async fn log_directory_is_created_even_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let c = collector(dir.path());

        let collected = c
            .collect_logs(&ProductId::from("sample-product"), &[])
            .await
            .unwrap();

        assert_eq!(collected, CollectedLogs::default());
        assert!(dir.path().join("logs").is_dir());
    }

    #[tokio::test]
    async fn summary_uses_crlf_and_blank_revision() {
        let dir = tempfile::tempdir().unwrap();
        let c = collector(dir.path());

        c.write_summary(&config(), None).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("output.properties")).unwrap(),
            "GIT_LOCATION=https://example.com/org/sample-product/tree/main\r\nGIT_REVISION=\r\n"
        );
    }

    #[tokio::test]
    async fn summary_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("output.properties"), "stale content that is longer").unwrap();
        let c = collector(dir.path());
        let tag = ResolvedTag::new("v4.2.0").unwrap();

        let summary = c.write_summary(&config(), Some(&tag)).await.unwrap();

        assert_eq!(summary.git_revision, "v4.2.0");
        let content = std::fs::read_to_string(dir.path().join("output.properties")).unwrap();
        assert!(content.ends_with("GIT_REVISION=v4.2.0\r\n"));
        assert!(!content.contains("stale"));
    }

    #[tokio::test]
    async fn report_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let c = collector(dir.path());
        let mut report = RunReport::new(uuid::Uuid::new_v4());
        report.record(
            Stage::LoadConfiguration,
            StageStatus::Succeeded,
            Duration::from_millis(2),
            None,
        );

        let path = c.write_report(&report).await.unwrap();

        assert_eq!(path, dir.path().join("logs/run-report.json"));
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["run_id"], report.run_id.to_string());
        assert_eq!(value["stages"][0]["stage"], "load-configuration");
    }
}
