// src/commands/layout.rs
//
// `quiver layout`: register the synthetic type and print the layout, unit
// name and strategy of every invoker kind.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use quiver_engine::{
    AcquireError, GenerationResult, InvokerCache, InvokerKind, Layout, ScopeKind,
};
use quiver_meta::TypeRegistry;

use super::{finish, load_config};
use crate::bench::{WideShape, register_wide};
use crate::errors::CliError;

pub fn print_layouts(
    shape: WideShape,
    scope: Option<ScopeKind>,
    config: Option<&Path>,
) -> ExitCode {
    finish(layouts(shape, scope, config))
}

fn layouts(
    shape: WideShape,
    scope: Option<ScopeKind>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let registry = Arc::new(TypeRegistry::new());
    let info = register_wide(&registry, shape)?;
    let scope = scope.unwrap_or(config.default_scope).for_type(&info);
    let cache = InvokerCache::with_config(registry.clone(), &config);

    for kind in InvokerKind::ALL {
        let result = cache
            .get(info.key, kind, scope)
            .map_err(AcquireError::from)?;
        print_result(kind, &result);
    }

    let stats = cache.stats();
    println!(
        "{} generated, {} failed, {} distinct unit names",
        stats.generations,
        stats.failures,
        cache.unit_count()
    );
    Ok(())
}

fn print_result(kind: InvokerKind, result: &GenerationResult) {
    match result {
        GenerationResult::Generated(unit) => {
            println!("{} ({}, {})", unit.name, unit.id, unit.strategy);
            println!("{}", layout_table(&unit.layout));
        }
        GenerationResult::Failed(failure) => {
            println!("{kind}: not generated: {failure}\n");
        }
    }
}

fn layout_table(layout: &Layout) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["index", "shape", "member", "visibility"]);

    for bucket in layout.buckets() {
        for member in &layout.members()[bucket.range.clone()] {
            let mut member_cell = Cell::new(member.to_string());
            if layout.kind() == InvokerKind::Field && !member.writable {
                member_cell = member_cell.fg(Color::Yellow);
            }
            table.add_row(vec![
                Cell::new(member.index),
                Cell::new(bucket.shape),
                member_cell,
                Cell::new(member.visibility.as_str()),
            ]);
        }
    }
    table
}
