//! CPU capture model
//!
//! A [`CpuCapture`] wraps a parsed trace for the lifetime of a profiling view.
//! Everything about it is fixed at construction except the active clock type,
//! which is pushed down to every node of every thread's call tree.

use crate::domain::{CaptureError, ClockType, ProfilerType, ThreadId, ThreadInfo, TimeRange};
use crate::parser::TraceParser;
use crate::tree::{CaptureNode, CaptureTree};

/// Duration metadata consumed by timeline selection
pub trait DurationData {
    /// Length of the data in microseconds
    fn duration_us(&self) -> i64;

    /// Whether the data stays selectable when it spans the whole view
    fn selectable_when_max_duration(&self) -> bool;

    /// Whether a sub-range of the data can be selected
    fn can_select_partial_range(&self) -> bool;
}

/// A parsed profiling session
pub struct CpuCapture {
    parser: Box<dyn TraceParser>,
    main_thread_id: ThreadId,
    clock_type: ClockType,
    /// ID of the trace used to generate the capture
    trace_id: i32,
    /// Technology used to generate the capture
    profiler_type: ProfilerType,
}

impl CpuCapture {
    /// Build a capture from a parser's output.
    ///
    /// # Panics
    /// Panics if the parser produced no threads. Use [`try_new`](Self::try_new)
    /// for input that has not been validated.
    pub fn new(parser: Box<dyn TraceParser>, trace_id: i32, profiler_type: ProfilerType) -> Self {
        match Self::try_new(parser, trace_id, profiler_type) {
            Ok(capture) => capture,
            Err(e) => panic!("{e}"),
        }
    }

    /// Build a capture, reporting an empty trace as an error.
    ///
    /// # Errors
    /// Returns [`CaptureError::EmptyCaptureTree`] if the parser produced no threads
    pub fn try_new(
        parser: Box<dyn TraceParser>,
        trace_id: i32,
        profiler_type: ProfilerType,
    ) -> Result<Self, CaptureError> {
        let tree = parser.capture_trees();
        let (main_thread_id, main_root) =
            select_main_thread(tree).ok_or(CaptureError::EmptyCaptureTree)?;

        // The parser already tagged the nodes; adopt whatever the main root reports
        let clock_type = main_root.clock_type();

        log::debug!(
            "Capture {trace_id} ({profiler_type}): {} threads, main thread {main_thread_id}, clock {clock_type}",
            tree.thread_count()
        );

        Ok(Self { parser, main_thread_id, clock_type, trace_id, profiler_type })
    }

    pub fn main_thread_id(&self) -> ThreadId {
        self.main_thread_id
    }

    pub fn range(&self) -> TimeRange {
        self.parser.range()
    }

    /// Root call tree node of `thread_id`, or `None` if the thread is not part
    /// of this capture
    pub fn capture_node(&self, thread_id: ThreadId) -> Option<&CaptureNode> {
        let tree = self.parser.capture_trees();
        tree.root(thread_id).and_then(|root| tree.node(root))
    }

    /// All threads in the capture
    pub fn threads(&self) -> impl ExactSizeIterator<Item = &ThreadInfo> {
        self.parser.capture_trees().threads()
    }

    pub fn contains_thread(&self, thread_id: ThreadId) -> bool {
        self.parser.capture_trees().threads().any(|info| info.id == thread_id)
    }

    /// The full call tree arena, for walking below the roots
    pub fn tree(&self) -> &CaptureTree {
        self.parser.capture_trees()
    }

    pub fn clock_type(&self) -> ClockType {
        self.clock_type
    }

    /// Switch every node of every thread to `clock_type`.
    ///
    /// Does nothing if the capture already uses `clock_type`.
    pub fn set_clock_type(&mut self, clock_type: ClockType) {
        if self.clock_type == clock_type {
            return;
        }
        self.clock_type = clock_type;
        self.parser.capture_trees_mut().set_clock_type(clock_type);
    }

    pub fn is_dual_clock(&self) -> bool {
        self.parser.supports_dual_clock()
    }

    pub fn trace_id(&self) -> i32 {
        self.trace_id
    }

    pub fn profiler_type(&self) -> ProfilerType {
        self.profiler_type
    }
}

impl DurationData for CpuCapture {
    fn duration_us(&self) -> i64 {
        self.parser.range().length()
    }

    fn selectable_when_max_duration(&self) -> bool {
        false
    }

    fn can_select_partial_range(&self) -> bool {
        true
    }
}

/// Pick the main thread and its root: the first thread flagged main, otherwise
/// the first thread whose root has the longest duration.
fn select_main_thread(tree: &CaptureTree) -> Option<(ThreadId, &CaptureNode)> {
    let mut best: Option<(ThreadId, &CaptureNode)> = None;
    for (info, root) in tree.roots() {
        // Registered roots always index into the arena
        let Some(node) = tree.node(root) else { continue };
        if info.is_main_thread {
            return Some((info.id, node));
        }
        match best {
            Some((_, best_node)) if best_node.duration() >= node.duration() => {}
            _ => best = Some((info.id, node)),
        }
    }
    best
}
