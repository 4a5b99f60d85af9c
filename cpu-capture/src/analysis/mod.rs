//! Analysis logic for captures
//!
//! This module contains pure logic for summarizing a capture, separated from
//! the CLI presentation layer.

pub mod summary;

pub use summary::{summarize, CaptureSummary, ThreadSummary};
