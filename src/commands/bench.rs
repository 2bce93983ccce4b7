// src/commands/bench.rs
//
// `quiver bench`: run the benchmarks and display the results.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};

use super::finish;
use crate::bench::{BenchConfig, BenchmarkRun, format_ns, run};
use crate::errors::CliError;

pub fn run_bench(config: &BenchConfig, output: Option<&Path>) -> ExitCode {
    finish(bench(config, output))
}

fn bench(config: &BenchConfig, output: Option<&Path>) -> Result<(), CliError> {
    if cfg!(debug_assertions) {
        eprintln!("note: debug build, timings are not representative");
    }
    eprintln!(
        "Benchmarking {} fields, {} methods ({} iterations, {} warmup)...",
        config.shape.fields, config.shape.methods, config.iterations, config.warmup
    );

    let run = run(config)?;
    println!("{}", results_table(&run));

    if let Some(path) = output {
        write_json(&run, path)?;
        eprintln!("\nResults written to: {}", path.display());
    }
    Ok(())
}

fn results_table(run: &BenchmarkRun) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["operation", "strategy", "ops", "mean", "median", "min", "max"]);

    for result in &run.results {
        let stats = &result.ns_per_op;
        table.add_row(vec![
            Cell::new(result.operation),
            Cell::new(result.strategy),
            Cell::new(result.members).set_alignment(CellAlignment::Right),
            Cell::new(format_ns(stats.mean)).set_alignment(CellAlignment::Right),
            Cell::new(format_ns(stats.median)).set_alignment(CellAlignment::Right),
            Cell::new(format_ns(stats.min)).set_alignment(CellAlignment::Right),
            Cell::new(format_ns(stats.max)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn write_json(run: &BenchmarkRun, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(run)?;
    fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
