//! Trace parsing
//!
//! A [`TraceParser`] supplies everything a [`CpuCapture`](crate::capture::CpuCapture)
//! needs: the per-thread call trees, the overall time range, and whether the
//! trace recorded thread time alongside wall time.

pub mod chrome_trace;

pub use chrome_trace::ChromeTraceParser;

use crate::domain::TimeRange;
use crate::tree::CaptureTree;

/// Source of a parsed execution trace
pub trait TraceParser {
    /// Thread -> root call tree mapping
    fn capture_trees(&self) -> &CaptureTree;

    /// Mutable access for clock type propagation
    fn capture_trees_mut(&mut self) -> &mut CaptureTree;

    /// Time range covered by the trace, in microseconds
    fn range(&self) -> TimeRange;

    /// Whether nodes carry real thread-clock timestamps
    fn supports_dual_clock(&self) -> bool;
}

/// Trace assembled elsewhere and handed over as-is
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    tree: CaptureTree,
    range: TimeRange,
    dual_clock: bool,
}

impl ParsedTrace {
    pub fn new(tree: CaptureTree, range: TimeRange, dual_clock: bool) -> Self {
        Self { tree, range, dual_clock }
    }
}

impl TraceParser for ParsedTrace {
    fn capture_trees(&self) -> &CaptureTree {
        &self.tree
    }

    fn capture_trees_mut(&mut self) -> &mut CaptureTree {
        &mut self.tree
    }

    fn range(&self) -> TimeRange {
        self.range
    }

    fn supports_dual_clock(&self) -> bool {
        self.dual_clock
    }
}
