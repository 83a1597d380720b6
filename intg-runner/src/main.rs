use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use intg_core::config::RunnerSettings;
use intg_core::error::IntgError;
use intg_core::process::SystemProcessRunner;
use intg_core::workspace::Workspace;
use intg_runner::cli::RunnerCli;
use intg_runner::logging::init_tracing;
use intg_runner::{Orchestrator, RunnerError, new_report};

// Stages run strictly one after another, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = RunnerCli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("intg-runner: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: RunnerCli) -> Result<(), RunnerError> {
    let mut settings = RunnerSettings::load_or_default(&cli.settings).await?;

    // CLI 인자가 설정 파일과 환경변수보다 우선
    if let Some(level) = cli.log_level {
        settings.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        settings.general.log_format = format;
    }
    settings.validate()?;

    init_tracing(&settings.general).map_err(|e| RunnerError::Logging(e.to_string()))?;

    let workspace = match cli.workspace {
        Some(dir) => Workspace::at(std::path::absolute(dir).map_err(IntgError::from)?),
        None => Workspace::current().map_err(IntgError::from)?,
    };
    tracing::info!(
        workspace = %workspace.root().display(),
        settings = %cli.settings.display(),
        "intg-runner starting"
    );

    let orchestrator = Orchestrator::new(settings, workspace, Arc::new(SystemProcessRunner::new()));

    if cli.validate {
        let config = orchestrator.validate().await?;
        println!(
            "configuration is valid (product: {}, branch: {}, host: {}:{})",
            config.product_id(),
            config.branch(),
            config.host(),
            config.port()
        );
        return Ok(());
    }

    let mut report = new_report();
    orchestrator.run(&mut report).await
}
