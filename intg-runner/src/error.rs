//! Runner error type and exit code mapping.

use intg_core::error::{ErrorCategory, IntgError};
use intg_core::stage::Stage;

/// Error that ends a run.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A fatal stage failed; later stages did not run.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// The failed stage.
        stage: Stage,
        /// Underlying error.
        source: IntgError,
    },

    /// Settings or workspace could not be prepared before any stage ran.
    #[error("{0}")]
    Core(#[from] IntgError),

    /// The tracing subscriber could not be installed.
    #[error("logging initialization failed: {0}")]
    Logging(String),
}

impl RunnerError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 0    | Success                      |
    /// | 1    | Other failure                |
    /// | 2    | Configuration error          |
    /// | 3    | External tool failure        |
    /// | 4    | Resource access failure      |
    /// | 10   | IO error                     |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Stage { source, .. } | Self::Core(source) => category_code(source.category()),
            Self::Logging(_) => 1,
        }
    }

    /// The stage that failed, if the error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn category_code(category: ErrorCategory) -> u8 {
    match category {
        ErrorCategory::Configuration => 2,
        ErrorCategory::ExternalTool => 3,
        ErrorCategory::ResourceAccess => 4,
        ErrorCategory::Io => 10,
    }
}
