// src/bench/mod.rs
//
// Throughput of synthesized and fallback units over the synthetic type.

pub mod stats;
pub mod synthetic;

pub use stats::{Stats, format_ns};
pub use synthetic::{MAX_CONSTRUCTORS, WIDE_TYPE_NAME, Wide, WideShape, register_wide};

use std::hint::black_box;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use quiver_engine::{
    FieldLookup, GenerationScope, InvokeError, InvokerCache, MethodLookup, Shape, Strategy,
    Thresholds,
};
use quiver_meta::{PrimitiveKind, TypeRef, TypeRegistry, Value};
use serde::Serialize;

use crate::errors::CliError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BenchConfig {
    pub shape: WideShape,
    pub iterations: u32,
    pub warmup: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub operation: &'static str,
    pub strategy: &'static str,
    /// Operations per iteration.
    pub members: usize,
    pub ns_per_op: Stats,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRun {
    pub config: BenchConfig,
    pub results: Vec<BenchResult>,
}

/// Run every operation against both strategies.
pub fn run(config: &BenchConfig) -> Result<BenchmarkRun, CliError> {
    let registry = Arc::new(TypeRegistry::new());
    let info = register_wide(&registry, config.shape)?;

    let mut results = Vec::new();
    for (strategy, thresholds) in [
        (Strategy::Synthesized, Thresholds::uniform(usize::MAX)),
        (Strategy::Fallback, Thresholds::uniform(0)),
    ] {
        let cache = InvokerCache::new(registry.clone()).with_thresholds(thresholds);
        let fields = cache.fields(info.key, GenerationScope::Public)?;
        let methods = cache.methods(info.key, GenerationScope::Public)?;
        tracing::debug!(%strategy, fields = fields.field_count(), methods = methods.method_count(), "benchmarking");

        let mut bench = Bench {
            config,
            strategy,
            results: &mut results,
        };
        bench.fields(&fields)?;
        bench.methods(&methods)?;
    }

    Ok(BenchmarkRun {
        config: *config,
        results,
    })
}

struct Bench<'a> {
    config: &'a BenchConfig,
    strategy: Strategy,
    results: &'a mut Vec<BenchResult>,
}

impl Bench<'_> {
    fn measure<F>(&mut self, operation: &'static str, ops: usize, mut body: F) -> Result<(), CliError>
    where
        F: FnMut() -> Result<(), InvokeError>,
    {
        if ops == 0 {
            return Ok(());
        }
        for _ in 0..self.config.warmup {
            body()?;
        }
        let mut samples: Vec<Duration> = Vec::with_capacity(self.config.iterations as usize);
        for _ in 0..self.config.iterations {
            let start = Instant::now();
            body()?;
            samples.push(start.elapsed());
        }
        self.results.push(BenchResult {
            operation,
            strategy: self.strategy.as_str(),
            members: ops,
            ns_per_op: Stats::per_op(&samples, ops),
        });
        Ok(())
    }

    fn fields(&mut self, fields: &FieldLookup) -> Result<(), CliError> {
        let access = fields.access().clone();
        let longs = bucket(fields.layout().bucket(Shape::Primitive(PrimitiveKind::I64)));
        let names: Vec<String> = fields
            .layout()
            .members()
            .iter()
            .map(|m| m.name.to_string())
            .collect();
        let mut target = Wide::new(self.config.shape);

        self.measure("get_i64", longs.len(), || {
            for index in longs.clone() {
                black_box(access.get_i64(index, &target)?);
            }
            Ok(())
        })?;
        self.measure("set_i64", longs.len(), || {
            for index in longs.clone() {
                access.set_i64(index, &mut target, black_box(index as i64))?;
            }
            Ok(())
        })?;
        self.measure("get", names.len(), || {
            for index in 0..names.len() {
                black_box(access.get(index, &target)?);
            }
            Ok(())
        })?;
        self.measure("get by name", names.len(), || {
            for name in &names {
                black_box(fields.get(name, &target)?);
            }
            Ok(())
        })
    }

    fn methods(&mut self, methods: &MethodLookup) -> Result<(), CliError> {
        let invoker = methods.invoker().clone();
        let layout = methods.layout();
        let nullary = bucket(layout.bucket(Shape::Nullary));
        let longs = bucket(layout.bucket(Shape::Primitive(PrimitiveKind::I64)));
        let calls: Vec<(usize, Vec<Value>)> = layout
            .members()
            .iter()
            .map(|m| (m.index, m.params.iter().map(|p| bench_arg(*p)).collect()))
            .collect();
        let mut target = Wide::new(self.config.shape);

        self.measure("invoke0", nullary.len(), || {
            for index in nullary.clone() {
                black_box(invoker.invoke0(index, &mut target)?);
            }
            Ok(())
        })?;
        self.measure("invoke_with_i64", longs.len(), || {
            for index in longs.clone() {
                black_box(invoker.invoke_with_i64(index, &mut target, black_box(1))?);
            }
            Ok(())
        })?;
        self.measure("invoke", calls.len(), || {
            for (index, args) in &calls {
                black_box(invoker.invoke(*index, &mut target, args)?);
            }
            Ok(())
        })
    }
}

fn bucket(range: Option<Range<usize>>) -> Range<usize> {
    range.unwrap_or(0..0)
}

fn bench_arg(param: TypeRef) -> Value {
    match param {
        TypeRef::F64 => Value::F64(1.5),
        TypeRef::BOOL => Value::Bool(true),
        TypeRef::Str => Value::str("bench"),
        _ => Value::I64(1),
    }
}
