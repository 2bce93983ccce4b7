// src/errors/mod.rs
//! Errors of the `quiver` command-line tool and their rendering.

pub mod report;

pub use report::{render_to_stderr, render_to_string};

use std::path::PathBuf;

use miette::Diagnostic;
use quiver_engine::{AcquireError, ConfigError, InvokeError};
use quiver_meta::MetaError;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("cannot register the synthetic type: {0}")]
    #[diagnostic(code(Q4001))]
    Register(#[from] MetaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot write {}", path.display())]
    #[diagnostic(code(Q4002))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize benchmark results")]
    #[diagnostic(code(Q4003))]
    Json(#[from] serde_json::Error),
}
