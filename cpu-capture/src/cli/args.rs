//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::domain::{ClockType, ProfilerType};

#[derive(Parser)]
#[command(
    name = "cpu-capture",
    about = "Inspect per-thread call trees of a CPU trace",
    after_help = "\
EXAMPLES:
    cpu-capture trace.json                      Summarize using the recorded clock
    cpu-capture trace.json --clock thread       Report thread-time durations
    cpu-capture trace.json --json               Machine-readable summary"
)]
pub struct Args {
    /// Chrome trace JSON file to load
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Clock to report durations against (defaults to the recorded clock)
    #[arg(long, value_enum)]
    pub clock: Option<ClockArg>,

    /// Trace ID to attach to the capture
    #[arg(long, default_value = "0")]
    pub trace_id: i32,

    /// Technology the trace was recorded with
    #[arg(long, value_enum, default_value = "unspecified")]
    pub profiler: ProfilerArg,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClockArg {
    Wall,
    Thread,
}

impl From<ClockArg> for ClockType {
    fn from(arg: ClockArg) -> Self {
        match arg {
            ClockArg::Wall => ClockType::Wall,
            ClockArg::Thread => ClockType::Thread,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfilerArg {
    Art,
    Simpleperf,
    Atrace,
    Unspecified,
}

impl From<ProfilerArg> for ProfilerType {
    fn from(arg: ProfilerArg) -> Self {
        match arg {
            ProfilerArg::Art => ProfilerType::Art,
            ProfilerArg::Simpleperf => ProfilerType::Simpleperf,
            ProfilerArg::Atrace => ProfilerType::Atrace,
            ProfilerArg::Unspecified => ProfilerType::Unspecified,
        }
    }
}
