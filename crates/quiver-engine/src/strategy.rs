// strategy.rs
//
// Tiered choice between synthesized dispatch tables and per-call resolution.

use std::fmt;

use crate::config::Thresholds;
use crate::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Dense precomputed dispatch tables.
    Synthesized,
    /// Resolve the member by name and signature on every call.
    Fallback,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Synthesized => "synthesized",
            Strategy::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesize when the layout is strictly smaller than the threshold for
/// its kind.
pub fn select(layout: &Layout, thresholds: &Thresholds) -> Strategy {
    let threshold = thresholds.for_kind(layout.kind());
    let strategy = if layout.len() < threshold {
        Strategy::Synthesized
    } else {
        Strategy::Fallback
    };
    tracing::debug!(
        type_name = layout.type_name(),
        kind = %layout.kind(),
        members = layout.len(),
        threshold,
        %strategy,
        "selected strategy"
    );
    strategy
}
