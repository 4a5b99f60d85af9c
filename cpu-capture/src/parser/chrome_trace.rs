//! Chrome Trace Event Format reader
//!
//! Builds per-thread call trees from `X` (complete) events and `B`/`E` pairs.
//! Thread names come from `thread_name` metadata events. When every duration
//! event carries thread timestamps (`tts`, plus `tdur` for `X` events) the
//! trace is dual clock; otherwise thread times mirror wall times.
//!
//! Format reference: <https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview>

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

use super::TraceParser;
use crate::domain::{NodeId, ParseError, ThreadId, ThreadInfo, TimeRange};
use crate::tree::{CaptureNode, CaptureTree};

/// One raw event as found in `traceEvents`
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    name: String,
    /// Phase: "B" = begin, "E" = end, "X" = complete, "M" = metadata
    #[serde(default)]
    ph: String,
    /// Wall timestamp in microseconds
    #[serde(default)]
    ts: f64,
    #[serde(default)]
    dur: Option<f64>,
    /// Thread timestamp in microseconds
    #[serde(default)]
    tts: Option<f64>,
    #[serde(default)]
    tdur: Option<f64>,
    #[serde(default)]
    pid: i32,
    #[serde(default)]
    tid: i32,
    #[serde(default)]
    args: Option<JsonValue>,
}

/// A closed event before it is placed in a tree
#[derive(Debug)]
struct Span {
    name: String,
    wall: TimeRange,
    thread: Option<TimeRange>,
}

/// A `B` event waiting for its `E`
#[derive(Debug)]
struct OpenSpan {
    name: String,
    ts: i64,
    tts: Option<i64>,
}

#[derive(Debug, Default)]
struct ThreadEvents {
    pid: Option<i32>,
    name: Option<String>,
    spans: Vec<Span>,
    open: Vec<OpenSpan>,
}

/// Parser for Chrome trace JSON files
#[derive(Debug)]
pub struct ChromeTraceParser {
    tree: CaptureTree,
    range: TimeRange,
    dual_clock: bool,
}

impl ChromeTraceParser {
    /// Parse a trace file from disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid trace
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a trace held in memory
    ///
    /// Accepts either `{"traceEvents": [...]}` or a bare event array.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, begin/end events do not
    /// pair up, or the trace has no duration events
    pub fn from_json_str(content: &str) -> Result<Self, ParseError> {
        let json: JsonValue = serde_json::from_str(content)?;
        let events = match json {
            JsonValue::Object(mut map) => {
                map.remove("traceEvents").ok_or(ParseError::MissingTraceEvents)?
            }
            array @ JsonValue::Array(_) => array,
            _ => return Err(ParseError::MissingTraceEvents),
        };
        let events: Vec<RawEvent> = serde_json::from_value(events)?;
        Self::from_events(events)
    }

    fn from_events(events: Vec<RawEvent>) -> Result<Self, ParseError> {
        let (order, mut threads) = collect_spans(events)?;

        // Any thread still holding an open B event makes the trace unusable
        for tid in &order {
            if let Some(open) = threads[tid].open.last() {
                return Err(ParseError::UnterminatedEvent { tid: *tid, name: open.name.clone() });
            }
        }

        let spans = order.iter().flat_map(|tid| threads[tid].spans.iter());
        let range = union(spans.clone().map(|s| s.wall))
            .ok_or(ParseError::EmptyTrace)?
            .ok_or(ParseError::TraceRangeOverflow)?;
        let dual_clock = spans.clone().all(|s| s.thread.is_some());

        let mut tree = CaptureTree::new();
        for tid in &order {
            let Some(events) = threads.remove(tid) else { continue };
            if events.spans.is_empty() {
                continue;
            }
            let is_main = events.pid == Some(tid.0);
            let name = events.name.clone().unwrap_or_else(|| {
                if is_main {
                    "main".to_string()
                } else {
                    format!("thread-{}", tid.0)
                }
            });
            let root = build_thread_tree(&mut tree, *tid, &name, events.spans, dual_clock)?;
            tree.add_thread(ThreadInfo::new(*tid, name, is_main), root)?;
        }

        log::info!(
            "Parsed trace: {} threads, {} nodes, range {}, dual clock: {}",
            tree.thread_count(),
            tree.node_count(),
            range,
            dual_clock
        );

        Ok(Self { tree, range, dual_clock })
    }
}

impl TraceParser for ChromeTraceParser {
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

/// Convert a float microsecond timestamp to whole microseconds
#[allow(clippy::cast_possible_truncation)]
fn micros(value: f64) -> i64 {
    value.round() as i64
}

/// Group events by thread and close B/E pairs into spans.
///
/// Returns thread IDs in order of first appearance alongside the per-thread data.
fn collect_spans(
    events: Vec<RawEvent>,
) -> Result<(Vec<ThreadId>, HashMap<ThreadId, ThreadEvents>), ParseError> {
    let mut order = Vec::new();
    let mut threads: HashMap<ThreadId, ThreadEvents> = HashMap::new();

    for event in events {
        let tid = ThreadId(event.tid);
        let entry = threads.entry(tid).or_insert_with(|| {
            order.push(tid);
            ThreadEvents::default()
        });
        entry.pid.get_or_insert(event.pid);

        match event.ph.as_str() {
            "M" => {
                if event.name == "thread_name" {
                    let name = event
                        .args
                        .as_ref()
                        .and_then(|args| args["name"].as_str())
                        .map(ToString::to_string);
                    if name.is_some() {
                        entry.name = name;
                    }
                }
            }
            "X" => {
                let dur = micros(event.dur.unwrap_or(0.0));
                let wall = range_from_length(tid, &event.name, micros(event.ts), dur)?;
                let thread = match (event.tts, event.tdur) {
                    (Some(tts), Some(tdur)) => {
                        Some(range_from_length(tid, &event.name, micros(tts), micros(tdur))?)
                    }
                    _ => None,
                };
                entry.spans.push(Span { name: event.name, wall, thread });
            }
            "B" => entry.open.push(OpenSpan {
                name: event.name,
                ts: micros(event.ts),
                tts: event.tts.map(micros),
            }),
            "E" => {
                let open = entry.open.pop().ok_or(ParseError::UnmatchedEnd { tid })?;
                let wall = range_between(tid, &open.name, open.ts, micros(event.ts))?;
                let thread = match (open.tts, event.tts.map(micros)) {
                    (Some(start), Some(end)) => Some(range_between(tid, &open.name, start, end)?),
                    _ => None,
                };
                entry.spans.push(Span { name: open.name, wall, thread });
            }
            other => log::debug!("Skipping event {} with phase {other:?}", event.name),
        }
    }

    Ok((order, threads))
}

/// Range of `length` µs starting at `start`
fn range_from_length(
    tid: ThreadId,
    name: &str,
    start: i64,
    length: i64,
) -> Result<TimeRange, ParseError> {
    if length < 0 {
        return Err(ParseError::InvalidDuration { tid, name: name.to_string() });
    }
    let end = start
        .checked_add(length)
        .ok_or_else(|| ParseError::TimestampOverflow { tid, name: name.to_string() })?;
    Ok(TimeRange::new(start, end))
}

/// Range between two timestamps; an end before the start is a negative duration
fn range_between(tid: ThreadId, name: &str, start: i64, end: i64) -> Result<TimeRange, ParseError> {
    if end < start {
        return Err(ParseError::InvalidDuration { tid, name: name.to_string() });
    }
    if end.checked_sub(start).is_none() {
        return Err(ParseError::TimestampOverflow { tid, name: name.to_string() });
    }
    Ok(TimeRange::new(start, end))
}

/// Smallest range covering all of `ranges`.
///
/// `None` if there are no ranges, `Some(None)` if the covering range is too
/// long to measure in µs.
fn union(ranges: impl Iterator<Item = TimeRange>) -> Option<Option<TimeRange>> {
    let covering = ranges
        .reduce(|a, b| TimeRange::new(a.start_us.min(b.start_us), a.end_us.max(b.end_us)))?;
    Some(covering.end_us.checked_sub(covering.start_us).map(|_| covering))
}

/// Nest one thread's spans by containment under a synthetic root.
fn build_thread_tree(
    tree: &mut CaptureTree,
    tid: ThreadId,
    thread_name: &str,
    mut spans: Vec<Span>,
    dual_clock: bool,
) -> Result<NodeId, ParseError> {
    // Parents sort before the children they contain
    spans.sort_by(|a, b| {
        a.wall.start_us.cmp(&b.wall.start_us).then(b.wall.end_us.cmp(&a.wall.end_us))
    });

    let thread_range = |span: &Span| {
        if dual_clock {
            span.thread.unwrap_or(span.wall)
        } else {
            span.wall
        }
    };

    let overflow = || ParseError::TimestampOverflow { tid, name: thread_name.to_string() };
    let root_wall = union(spans.iter().map(|s| s.wall))
        .ok_or(ParseError::EmptyTrace)?
        .ok_or_else(overflow)?;
    let root_thread = union(spans.iter().map(thread_range))
        .ok_or(ParseError::EmptyTrace)?
        .ok_or_else(overflow)?;

    let root = tree.push_node(CaptureNode::new(thread_name, 0, root_wall, root_thread));
    let mut stack: Vec<(NodeId, TimeRange)> = vec![(root, root_wall)];

    for span in spans {
        while let [_, .., (_, top)] = stack.as_slice() {
            if span.wall.end_us > top.end_us || span.wall.start_us >= top.end_us {
                stack.pop();
            } else {
                break;
            }
        }
        let Some(&(parent, _)) = stack.last() else { break };
        let thread = thread_range(&span);
        let node = tree.push_node(CaptureNode::new(span.name, stack.len(), span.wall, thread));
        tree.add_child(parent, node)?;
        stack.push((node, span.wall));
    }

    Ok(root)
}
