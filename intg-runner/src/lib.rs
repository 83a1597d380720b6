//! intg-runner library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `intg-runner` is used as a binary (main.rs).

pub mod cli;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use error::RunnerError;
pub use orchestrator::{Orchestrator, new_report};
