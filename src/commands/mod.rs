// src/commands/mod.rs
//! Implementations of the `quiver` subcommands.
//!
//! Each command returns an `ExitCode`; errors are rendered as diagnostics
//! before returning.

pub mod bench;
pub mod config;
pub mod layout;

use std::path::Path;
use std::process::ExitCode;

use quiver_engine::EngineConfig;

use crate::errors::{CliError, render_to_stderr};

/// Load the engine configuration from `file` (if any) and the environment.
pub fn load_config(file: Option<&Path>) -> Result<EngineConfig, CliError> {
    Ok(EngineConfig::load(file)?)
}

/// Render `result`'s error, if any, and map it to an exit code.
pub fn finish(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            render_to_stderr(&err);
            ExitCode::FAILURE
        }
    }
}
