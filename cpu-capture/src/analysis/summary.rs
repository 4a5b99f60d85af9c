//! Per-thread capture summary.
//!
//! Collapses each thread's call tree to a few numbers: root duration under the
//! capture's current clock, node count and maximum call depth.

use serde::Serialize;
use std::fmt;

use crate::capture::{CpuCapture, DurationData};
use crate::domain::{ClockType, ProfilerType, ThreadId};

/// Summary of one thread's call tree
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub name: String,
    pub is_main: bool,
    /// Root duration in microseconds under the capture's clock type
    pub duration_us: i64,
    pub node_count: usize,
    pub max_depth: usize,
}

/// Summary of a whole capture, in capture thread order
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    pub trace_id: i32,
    pub profiler: ProfilerType,
    pub clock: ClockType,
    pub dual_clock: bool,
    pub duration_us: i64,
    pub main_thread: ThreadId,
    pub threads: Vec<ThreadSummary>,
}

/// Summarize `capture` under its current clock type
pub fn summarize(capture: &CpuCapture) -> CaptureSummary {
    let tree = capture.tree();
    let threads = tree
        .roots()
        .map(|(info, root)| {
            let (node_count, max_depth) = tree
                .preorder(root)
                .fold((0, 0), |(count, depth), (_, node)| (count + 1, depth.max(node.depth())));
            ThreadSummary {
                id: info.id,
                name: info.name.clone(),
                is_main: info.id == capture.main_thread_id(),
                duration_us: tree.node(root).map_or(0, |node| node.duration()),
                node_count,
                max_depth,
            }
        })
        .collect();

    CaptureSummary {
        trace_id: capture.trace_id(),
        profiler: capture.profiler_type(),
        clock: capture.clock_type(),
        dual_clock: capture.is_dual_clock(),
        duration_us: capture.duration_us(),
        main_thread: capture.main_thread_id(),
        threads,
    }
}

impl fmt::Display for CaptureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "trace: {} ({})", self.trace_id, self.profiler)?;
        writeln!(f, "duration: {}us", self.duration_us)?;
        writeln!(f, "clock: {}{}", self.clock, if self.dual_clock { " (dual)" } else { "" })?;
        writeln!(f, "main thread: {}", self.main_thread)?;
        writeln!(f, "threads: {}", self.threads.len())?;
        for thread in &self.threads {
            let marker = if thread.is_main { "*" } else { " " };
            writeln!(
                f,
                "  {marker} {:<10} {:<20} {:>12}us  nodes={} depth={}",
                thread.id.to_string(),
                thread.name,
                thread.duration_us,
                thread.node_count,
                thread.max_depth
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ThreadInfo, TimeRange};
    use crate::parser::ParsedTrace;
    use crate::tree::{CaptureNode, CaptureTree};

    fn capture() -> CpuCapture {
        let mut tree = CaptureTree::new();
        let main = tree.push_node(CaptureNode::new(
            "main",
            0,
            TimeRange::new(0, 100),
            TimeRange::new(0, 30),
        ));
        let call = tree.push_node(CaptureNode::new(
            "onCreate",
            1,
            TimeRange::new(10, 90),
            TimeRange::new(5, 25),
        ));
        tree.add_child(main, call).unwrap();
        let worker = tree.push_node(CaptureNode::new(
            "worker",
            0,
            TimeRange::new(0, 200),
            TimeRange::new(0, 150),
        ));
        tree.add_thread(ThreadInfo::new(ThreadId(10), "main", true), main).unwrap();
        tree.add_thread(ThreadInfo::new(ThreadId(11), "worker", false), worker).unwrap();

        let parser = ParsedTrace::new(tree, TimeRange::new(0, 200), true);
        CpuCapture::new(Box::new(parser), 3, ProfilerType::Art)
    }

    #[test]
    fn test_summary_counts_nodes_and_depth() {
        let summary = summarize(&capture());
        assert_eq!(summary.main_thread, ThreadId(10));
        assert_eq!(summary.threads.len(), 2);

        let main = &summary.threads[0];
        assert!(main.is_main);
        assert_eq!(main.node_count, 2);
        assert_eq!(main.max_depth, 1);
        assert_eq!(main.duration_us, 100);

        let worker = &summary.threads[1];
        assert!(!worker.is_main);
        assert_eq!(worker.node_count, 1);
        assert_eq!(worker.max_depth, 0);
    }

    #[test]
    fn test_summary_uses_current_clock() {
        let mut capture = capture();
        capture.set_clock_type(ClockType::Thread);
        let summary = summarize(&capture);
        assert_eq!(summary.clock, ClockType::Thread);
        assert_eq!(summary.threads[0].duration_us, 30);
        assert_eq!(summary.threads[1].duration_us, 150);
        assert_eq!(summary.duration_us, 200);
    }

    #[test]
    fn test_summary_display_marks_main_thread() {
        let text = summarize(&capture()).to_string();
        assert!(text.contains("main thread: TID:10"));
        assert!(text.contains("clock: wall (dual)"));
        assert!(text.lines().any(|l| l.contains('*') && l.contains("TID:10")));
    }

    #[test]
    fn test_summary_serializes() {
        let json = serde_json::to_value(summarize(&capture())).unwrap();
        assert_eq!(json["main_thread"], 10);
        assert_eq!(json["profiler"], "art");
        assert_eq!(json["clock"], "wall");
        assert_eq!(json["threads"][1]["name"], "worker");
    }
}
