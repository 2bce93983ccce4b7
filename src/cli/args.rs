// src/cli/args.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use quiver_engine::ScopeKind;

/// Index-addressed member invokers
#[derive(Parser)]
#[command(name = "quiver")]
#[command(version)]
#[command(about = "Inspect and benchmark generated member invokers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the layouts generated for a synthetic type
    Layout {
        /// Number of fields
        #[arg(long, default_value_t = 12)]
        fields: usize,

        /// Number of methods
        #[arg(long, default_value_t = 8)]
        methods: usize,

        /// Number of constructors (at most 6)
        #[arg(long, default_value_t = 2)]
        constructors: usize,

        /// Visibility scope: public, module or nested
        #[arg(long)]
        scope: Option<ScopeKind>,
    },
    /// Measure field and method throughput of both strategies
    Bench {
        /// Number of fields
        #[arg(long, default_value_t = 64)]
        fields: usize,

        /// Number of methods
        #[arg(long, default_value_t = 32)]
        methods: usize,

        /// Measured iterations per operation
        #[arg(short = 'n', long, default_value_t = 100)]
        iterations: u32,

        /// Unmeasured iterations before measuring
        #[arg(long, default_value_t = 10)]
        warmup: u32,

        /// Write results as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the effective engine configuration
    Config,
}
