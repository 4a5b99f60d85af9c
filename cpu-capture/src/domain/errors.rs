//! Structured error types for cpu-capture
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::ThreadId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture tree cannot be empty")]
    EmptyCaptureTree,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("Thread {0} already has a root node")]
    DuplicateThread(ThreadId),

    #[error("Node index {0} is out of bounds")]
    InvalidNode(usize),

    #[error("Node {0} already has a parent or belongs to a thread")]
    AlreadyAttached(usize),

    #[error("Attaching node {child} under node {parent} would create a cycle")]
    Cycle { parent: usize, child: usize },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Trace has no traceEvents array")]
    MissingTraceEvents,

    #[error("Trace contains no duration events")]
    EmptyTrace,

    #[error("End event on thread {tid} has no matching begin event")]
    UnmatchedEnd { tid: ThreadId },

    #[error("Event {name} on thread {tid} was never closed")]
    UnterminatedEvent { tid: ThreadId, name: String },

    #[error("Event {name} on thread {tid} has a negative duration")]
    InvalidDuration { tid: ThreadId, name: String },

    #[error("Event {name} on thread {tid} has timestamps out of range")]
    TimestampOverflow { tid: ThreadId, name: String },

    #[error("Trace spans more time than fits in 64-bit microseconds")]
    TraceRangeOverflow,

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
