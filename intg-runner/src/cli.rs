//! CLI argument definitions for intg-runner.
//!
//! Uses `clap` v4 derive macros. With no flags the run is driven entirely by
//! the property files in the current directory.

use std::path::PathBuf;

use clap::Parser;

use intg_core::config::DEFAULT_SETTINGS_FILE;

/// Integration test environment runner.
///
/// Clones the product source, configures host resolution and TLS trust for
/// the target host, builds the product's integration test module and
/// archives the produced logs with a run summary.
#[derive(Parser, Debug)]
#[command(name = "intg-runner")]
#[command(version, about, long_about = None)]
pub struct RunnerCli {
    /// Path to the runner settings file. Defaults apply when it is absent.
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Workspace directory holding the property files (defaults to the
    /// current directory).
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the settings file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the settings file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Load and validate the run configuration, then exit without running
    /// any stage.
    #[arg(long)]
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_uses_defaults() {
        let cli = RunnerCli::try_parse_from(["intg-runner"]).unwrap();
        assert_eq!(cli.settings, PathBuf::from("intg-runner.toml"));
        assert!(cli.workspace.is_none());
        assert!(cli.log_level.is_none());
        assert!(!cli.validate);
    }

    #[test]
    fn all_flags_parse() {
        let cli = RunnerCli::try_parse_from([
            "intg-runner",
            "--settings",
            "/etc/intg/runner.toml",
            "--workspace",
            "/work",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.settings, PathBuf::from("/etc/intg/runner.toml"));
        assert_eq!(cli.workspace, Some(PathBuf::from("/work")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("json"));
        assert!(cli.validate);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(RunnerCli::try_parse_from(["intg-runner", "--retry"]).is_err());
    }
}
