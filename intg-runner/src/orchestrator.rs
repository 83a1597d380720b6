//! Stage orchestration -- ordered execution, fatality policy, run report.
//!
//! The [`Orchestrator`] owns one instance of every stage component and runs
//! them strictly in sequence against a single immutable run configuration.
//!
//! # Stage Order
//!
//! 1. Load configuration (both property files)
//! 2. Clone repository
//! 3. Pin latest tag (when `source.pin_latest_tag` is set)
//! 4. Substitute debug descriptors (`TEST_MODE=DEBUG` only)
//! 5. Environment steps from the product profile, in profile order
//! 6. Resolve distribution (profiles with a distribution descriptor)
//! 7. Pre-integration module builds
//! 8. Integration test module
//! 9. Collect logs
//! 10. Write summary
//!
//! A failing fatal stage stops the run and nothing after it executes.
//! Completed stages are not rolled back. Distribution resolution and log
//! collection failures are recorded and the run continues. The run report is
//! written to log storage whether or not the run completed.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use intg_build::{ArtifactCollector, TestOrchestrator, substitute_debug_resources};
use intg_core::config::RunnerSettings;
use intg_core::error::IntgError;
use intg_core::process::ProcessRunner;
use intg_core::properties::{RunConfiguration, load_run_configuration};
use intg_core::stage::{RunOutcome, RunReport, Stage, StageStatus};
use intg_core::types::{ResolvedTag, TestMode};
use intg_core::workspace::Workspace;
use intg_environment::EnvironmentConfigurator;
use intg_source::{ArtifactResolver, RepositoryManager};

use crate::error::RunnerError;

/// The main runner orchestrator.
pub struct Orchestrator<P: ProcessRunner> {
    /// Validated runner settings.
    settings: RunnerSettings,
    /// Workspace every path is derived from.
    workspace: Workspace,
    repository: RepositoryManager<P>,
    resolver: ArtifactResolver,
    environment: EnvironmentConfigurator<P>,
    tests: TestOrchestrator<P>,
    collector: ArtifactCollector,
}

impl<P: ProcessRunner> Orchestrator<P> {
    /// Build the orchestrator from already-loaded settings.
    ///
    /// All external tools go through `runner`.
    pub fn new(settings: RunnerSettings, workspace: Workspace, runner: Arc<P>) -> Self {
        let repository =
            RepositoryManager::new(Arc::clone(&runner), &settings.tools.git, workspace.clone());
        let resolver = ArtifactResolver::new(workspace.clone());
        let environment = EnvironmentConfigurator::new(
            Arc::clone(&runner),
            &settings.tools,
            &settings.environment,
            workspace.clone(),
        );
        let tests = TestOrchestrator::new(runner, &settings.tools.build, workspace.clone());
        let collector =
            ArtifactCollector::new(workspace.clone(), &settings.storage, &settings.inputs);

        Self {
            settings,
            workspace,
            repository,
            resolver,
            environment,
            tests,
            collector,
        }
    }

    /// Settings this orchestrator was built with.
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Load and validate the run configuration without running any stage.
    pub async fn validate(&self) -> Result<RunConfiguration, RunnerError> {
        load_run_configuration(&self.workspace, &self.settings.inputs)
            .await
            .map_err(|source| RunnerError::Stage {
                stage: Stage::LoadConfiguration,
                source,
            })
    }

    /// Run every stage in order, recording each into `report`.
    ///
    /// The report is written to log storage before returning, also when a
    /// fatal stage failed. A report write failure is logged and does not
    /// change the result.
    pub async fn run(&self, report: &mut RunReport) -> Result<(), RunnerError> {
        let span = info_span!(
            "run",
            run_id = %report.run_id,
            product = tracing::field::Empty
        );

        async move {
            let started = Instant::now();
            info!("integration test run starting");

            let result = self.execute(report).await;
            report.outcome = if result.is_ok() {
                RunOutcome::Completed
            } else {
                RunOutcome::Aborted
            };

            match self.collector.write_report(report).await {
                Ok(path) => info!(path = %path.display(), "run report saved"),
                Err(e) => warn!(error = %e, "failed to write run report"),
            }

            match &result {
                Ok(()) => info!(
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "integration test run completed"
                ),
                Err(e) => error!(
                    error = %e,
                    exit_code = e.exit_code(),
                    "integration test run aborted"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, report: &mut RunReport) -> Result<(), RunnerError> {
        let config = required(
            report,
            Stage::LoadConfiguration,
            None,
            load_run_configuration(&self.workspace, &self.settings.inputs),
        )
        .await?;
        let product = config.product_id();
        report.product_id = Some(product.to_string());
        tracing::Span::current().record("product", product.as_str());

        let profile = self.settings.profile(product);

        required(
            report,
            Stage::CloneRepository,
            None,
            self.repository.clone_repository(&config),
        )
        .await?;

        let mut revision: Option<ResolvedTag> = None;
        if self.settings.source.pin_latest_tag {
            let tag = required(
                report,
                Stage::PinLatestTag,
                None,
                self.repository.pin_latest_tag(product),
            )
            .await?;
            revision = Some(tag);
        }

        if config.test_mode() == TestMode::Debug {
            required(
                report,
                Stage::SubstituteDebugResources,
                None,
                substitute_debug_resources(&self.workspace, product, &profile.debug_resources),
            )
            .await?;
        }

        for step in &profile.environment_steps {
            required(
                report,
                Stage::from(*step),
                None,
                self.environment.apply(*step, &config, &profile),
            )
            .await?;
        }

        if let Some(descriptor) = &profile.distribution_pom {
            optional(report, Stage::ResolveDistribution, None, async {
                let identity = self.resolver.resolve(product, descriptor).await?;
                let archive = self
                    .resolver
                    .archive_path(&self.settings.storage.product_dir, &identity)
                    .await?;
                info!(archive = %archive.display(), "distribution archive location");
                Ok::<_, intg_source::SourceError>(identity)
            })
            .await;
        }

        for module in &profile.pre_integration_modules {
            required(
                report,
                Stage::BuildModule,
                Some(module.clone()),
                self.tests.build_module(product, module),
            )
            .await?;
        }

        required(
            report,
            Stage::RunIntegrationTests,
            Some(profile.integration_module.clone()),
            self.tests.run_integration_tests(product, &profile),
        )
        .await?;

        let collected = optional(
            report,
            Stage::CollectLogs,
            None,
            self.collector.collect_logs(product, &profile.log_files),
        )
        .await;
        if let Some(collected) = collected.filter(|c| c.is_partial()) {
            warn!(
                copied = collected.copied.len(),
                missing = collected.missing.len(),
                failed = collected.failed.len(),
                "some log files were not archived"
            );
        }

        required(
            report,
            Stage::WriteSummary,
            None,
            self.collector.write_summary(&config, revision.as_ref()),
        )
        .await?;

        Ok(())
    }
}

/// Run a fatal stage. A failure is recorded and returned.
///
/// Only stages for which [`Stage::is_fatal`] holds may run through here.
async fn required<T, E, F>(
    report: &mut RunReport,
    stage: Stage,
    detail: Option<String>,
    work: F,
) -> Result<T, RunnerError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<IntgError>,
{
    debug_assert!(stage.is_fatal(), "{stage} is tolerated and must run through `optional`");
    let started = Instant::now();
    info!(stage = %stage, detail = ?detail, "stage started");

    match work.await {
        Ok(value) => {
            report.record(stage, StageStatus::Succeeded, started.elapsed(), detail);
            info!(stage = %stage, "stage completed");
            Ok(value)
        }
        Err(e) => {
            let source: IntgError = e.into();
            error!(
                stage = %stage,
                category = %source.category(),
                error = %source,
                "stage failed"
            );
            report.record(
                stage,
                StageStatus::Failed,
                started.elapsed(),
                Some(source.to_string()),
            );
            Err(RunnerError::Stage { stage, source })
        }
    }
}

/// Run a non-fatal stage. A failure is recorded as degraded and the run
/// continues.
///
/// Only stages for which [`Stage::is_fatal`] is false may run through here.
async fn optional<T, E, F>(
    report: &mut RunReport,
    stage: Stage,
    detail: Option<String>,
    work: F,
) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<IntgError>,
{
    debug_assert!(!stage.is_fatal(), "{stage} is fatal and must run through `required`");
    let started = Instant::now();
    info!(stage = %stage, detail = ?detail, "stage started");

    match work.await {
        Ok(value) => {
            report.record(stage, StageStatus::Succeeded, started.elapsed(), detail);
            info!(stage = %stage, "stage completed");
            Some(value)
        }
        Err(e) => {
            let source: IntgError = e.into();
            warn!(
                stage = %stage,
                category = %source.category(),
                error = %source,
                "stage failed, continuing"
            );
            report.record(
                stage,
                StageStatus::Degraded,
                started.elapsed(),
                Some(source.to_string()),
            );
            None
        }
    }
}

/// Start a report for a new run.
pub fn new_report() -> RunReport {
    RunReport::new(Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use intg_core::error::{ExternalToolError, ResourceError};

    use super::*;

    #[tokio::test]
    async fn required_failure_is_recorded_and_returned() {
        let mut report = new_report();

        let result: Result<(), RunnerError> = required(
            &mut report,
            Stage::CloneRepository,
            None,
            async {
                Err::<(), _>(ExternalToolError::Failed {
                    program: "git".to_owned(),
                    code: Some(128),
                    stderr: String::new(),
                })
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::CloneRepository));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(report.failed_stage(), Some(Stage::CloneRepository));
    }

    #[tokio::test]
    async fn optional_failure_is_degraded() {
        let mut report = new_report();

        let value = optional(&mut report, Stage::ResolveDistribution, None, async {
            Err::<u32, _>(ResourceError::NotFound {
                path: "pom.xml".to_owned(),
            })
        })
        .await;

        assert!(value.is_none());
        assert_eq!(report.stages[0].status, StageStatus::Degraded);
        assert_eq!(report.failed_stage(), None);
    }

    #[tokio::test]
    async fn helpers_pass_values_through() {
        let mut report = new_report();

        let loaded = required(&mut report, Stage::WriteSummary, None, async {
            Ok::<_, IntgError>(7)
        })
        .await
        .unwrap();
        let collected = optional(&mut report, Stage::CollectLogs, None, async {
            Ok::<_, IntgError>("logs")
        })
        .await;

        assert_eq!(loaded, 7);
        assert_eq!(collected, Some("logs"));
        assert!(report.stages.iter().all(|r| r.status == StageStatus::Succeeded));
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "must run through `optional`")]
    async fn tolerated_stage_cannot_run_as_required() {
        let mut report = new_report();
        let _ = required(&mut report, Stage::CollectLogs, None, async {
            Ok::<_, IntgError>(())
        })
        .await;
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "must run through `required`")]
    async fn fatal_stage_cannot_run_as_optional() {
        let mut report = new_report();
        let _ = optional(&mut report, Stage::BuildModule, None, async {
            Ok::<_, IntgError>(())
        })
        .await;
    }
}
