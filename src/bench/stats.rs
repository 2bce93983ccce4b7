// src/bench/stats.rs
//
// Summary statistics over per-iteration timings.

use std::time::Duration;

use serde::Serialize;

/// Summary of a set of samples, in nanoseconds per operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: 0.0,
                median: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
                count: 0,
            };
        }

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        // Sample standard deviation (n-1 denominator)
        let variance = if count > 1 {
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };

        Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            std_dev: variance.sqrt(),
            count,
        }
    }

    /// Per-operation nanoseconds from per-iteration durations, each covering
    /// `ops` operations.
    pub fn per_op(iterations: &[Duration], ops: usize) -> Self {
        let ops = ops.max(1) as f64;
        let samples: Vec<f64> = iterations
            .iter()
            .map(|d| d.as_nanos() as f64 / ops)
            .collect();
        Self::from_samples(&samples)
    }
}

/// Format nanoseconds with a unit that keeps the number short.
pub fn format_ns(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{ns:.1}ns")
    } else if ns < 1_000_000.0 {
        format!("{:.2}us", ns / 1_000.0)
    } else {
        format!("{:.2}ms", ns / 1_000_000.0)
    }
}
