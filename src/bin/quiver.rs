// src/bin/quiver.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use quiver::bench::{BenchConfig, WideShape};
use quiver::cli::{Cli, Commands};
use quiver::commands::bench::run_bench;
use quiver::commands::config::print_config;
use quiver::commands::layout::print_layouts;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

fn init_tracing() {
    // QUIVER_LOG_STYLE: "compact" (default) or "full" (with timestamps)
    let Ok(filter) = EnvFilter::try_from_env("QUIVER_LOG") else {
        return;
    };
    let full = std::env::var("QUIVER_LOG_STYLE").is_ok_and(|style| style == "full");
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if full {
        builder.init();
    } else {
        builder.with_timer(NoTimestamp).init();
    }
    tracing::debug!("tracing initialized");
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Layout {
            fields,
            methods,
            constructors,
            scope,
        } => print_layouts(
            WideShape {
                fields,
                methods,
                constructors,
            },
            scope,
            config,
        ),
        Commands::Bench {
            fields,
            methods,
            iterations,
            warmup,
            output,
        } => run_bench(
            &BenchConfig {
                shape: WideShape {
                    fields,
                    methods,
                    constructors: 0,
                },
                iterations,
                warmup,
            },
            output.as_deref(),
        ),
        Commands::Config => print_config(config),
    }
}
