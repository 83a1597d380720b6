//! Logging initialization for intg-runner.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `RunnerSettings`. Log lines go to stderr: stdout belongs to the build
//! tool output the runner inherits and to the `--validate` summary.
//!
//! In JSON mode every line carries the fields of the enclosing `run` span,
//! so `run_id` and `product` can be used to correlate a run in a CI log
//! collector.

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use intg_core::config::GeneralSettings;

/// Output format of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, with the current span's fields.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
        }
    }
}

/// Build the level filter. `RUST_LOG` takes precedence over `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
}

/// Initialize the global tracing subscriber.
///
/// Must be called once, before the first stage runs.
pub fn init_tracing(settings: &GeneralSettings) -> Result<()> {
    let format: LogFormat = settings.log_format.parse()?;
    let filter = build_filter(&settings.log_level)?;
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(layer.json().with_current_span(true).with_span_list(false))
            .try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
    };
    installed.with_context(|| format!("failed to initialize {format:?} tracing subscriber"))
}
