//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep thread IDs, node indices and timestamps from
//! being mixed up, and make the capture API signatures more expressive.

use serde::Serialize;
use std::fmt;

/// Thread ID
///
/// Represents a thread ID as recorded by the trace producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ThreadId(pub i32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Thread metadata attached to one call tree root
///
/// Identity is the thread ID; the name is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadInfo {
    pub id: ThreadId,
    pub name: String,
    pub is_main_thread: bool,
}

impl ThreadInfo {
    pub fn new(id: ThreadId, name: impl Into<String>, is_main_thread: bool) -> Self {
        Self { id, name: name.into(), is_main_thread }
    }
}

/// Index of a node inside a [`CaptureTree`](crate::tree::CaptureTree) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which clock node timestamps are interpreted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockType {
    /// Wall-clock time, including time the thread spent off-CPU
    Wall,
    /// Thread time, only counting time the thread was scheduled
    Thread,
}

impl fmt::Display for ClockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockType::Wall => write!(f, "wall"),
            ClockType::Thread => write!(f, "thread"),
        }
    }
}

/// Technology used to record the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilerType {
    Art,
    Simpleperf,
    Atrace,
    #[default]
    Unspecified,
}

impl fmt::Display for ProfilerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfilerType::Art => "art",
            ProfilerType::Simpleperf => "simpleperf",
            ProfilerType::Atrace => "atrace",
            ProfilerType::Unspecified => "unspecified",
        };
        write!(f, "{name}")
    }
}

/// Time interval in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start_us: i64,
    pub end_us: i64,
}

impl TimeRange {
    pub fn new(start_us: i64, end_us: i64) -> Self {
        Self { start_us, end_us }
    }

    /// Length of the interval in microseconds, saturating at the `i64` bounds
    pub fn length(self) -> i64 {
        self.end_us.saturating_sub(self.start_us)
    }

    /// Convert the length to milliseconds (f64)
    #[allow(clippy::cast_precision_loss)]
    pub fn as_millis(self) -> f64 {
        self.length() as f64 / 1_000.0
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        if ms >= 1000.0 {
            write!(f, "{:.2}s", ms / 1000.0)
        } else {
            write!(f, "{ms:.2}ms")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_id_display() {
        assert_eq!(ThreadId(42).to_string(), "TID:42");
    }

    #[test]
    fn test_clock_type_display() {
        assert_eq!(ClockType::Wall.to_string(), "wall");
        assert_eq!(ClockType::Thread.to_string(), "thread");
    }

    #[test]
    fn test_profiler_type_defaults_to_unspecified() {
        assert_eq!(ProfilerType::default(), ProfilerType::Unspecified);
        assert_eq!(ProfilerType::Simpleperf.to_string(), "simpleperf");
    }

    #[test]
    fn test_time_range_length() {
        let range = TimeRange::new(1_000, 4_500);
        assert_eq!(range.length(), 3_500);
        assert_eq!(range.as_millis(), 3.5);
    }

    #[test]
    fn test_time_range_length_saturates() {
        assert_eq!(TimeRange::new(i64::MIN, i64::MAX).length(), i64::MAX);
        assert_eq!(TimeRange::new(i64::MAX, i64::MIN).length(), i64::MIN);
    }

    #[test]
    fn test_time_range_display() {
        assert_eq!(TimeRange::new(0, 5_000).to_string(), "5.00ms");
        assert_eq!(TimeRange::new(0, 1_500_000).to_string(), "1.50s");
    }

    #[test]
    fn test_thread_info_equality_includes_flag() {
        let a = ThreadInfo::new(ThreadId(1), "main", true);
        let b = ThreadInfo::new(ThreadId(1), "main", false);
        assert_ne!(a, b);
        assert_eq!(a.id, b.id);
    }
}
