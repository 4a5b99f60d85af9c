//! # cpu-capture - CPU Trace Capture Model
//!
//! Holds a parsed execution trace as a per-thread call tree and answers the
//! duration and clock-type queries a profiler timeline needs.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Trace file   │────▶│ TraceParser  │────▶│  CpuCapture  │
//! │ (JSON)       │     │ (per-thread  │     │ (main thread,│
//! └──────────────┘     │  call trees) │     │  clock type) │
//!                      └──────────────┘     └──────┬───────┘
//!                                                  │
//!                                                  ▼
//!                                           ┌──────────────┐
//!                                           │   Analysis   │
//!                                           │  (summary)   │
//!                                           └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: Core domain types (`ThreadId`, `ClockType`, `TimeRange`) and errors
//! - [`tree`]: Arena-backed call trees, one root per thread
//! - [`parser`]: The `TraceParser` trait and a Chrome Trace Event Format reader
//! - [`capture`]: `CpuCapture`, main thread selection and clock switching
//! - [`analysis`]: Per-thread summaries for display
//! - [`cli`]: Command-line argument parsing
//!
//! ## Key Concepts
//!
//! - **Clock type**: node timestamps are read either against wall-clock time or
//!   thread time. A capture switches every node at once.
//! - **Dual clock**: the trace recorded thread time next to wall time. Without
//!   it, thread durations equal wall durations.
//! - **Main thread**: the thread flagged main by the recorder, or failing
//!   that, the thread whose root call spans the longest.

pub mod analysis;
pub mod capture;
pub mod cli;
pub mod domain;
pub mod parser;
pub mod tree;
