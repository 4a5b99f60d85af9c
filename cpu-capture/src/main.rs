//! # cpu-capture - Main Entry Point
//!
//! Loads a Chrome trace, builds a capture and prints a per-thread summary.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use cpu_capture::analysis::summarize;
use cpu_capture::capture::CpuCapture;
use cpu_capture::cli::{Args, ClockArg};
use cpu_capture::parser::ChromeTraceParser;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            // --help and --version also land here
            e.print().ok();
            std::process::exit(code);
        }
    };
    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run(args: &Args) -> Result<()> {
    let parser = ChromeTraceParser::from_file(&args.trace)
        .with_context(|| format!("Failed to load trace {}", args.trace.display()))?;
    let mut capture = CpuCapture::try_new(Box::new(parser), args.trace_id, args.profiler.into())
        .context("Failed to build capture")?;

    if let Some(clock) = args.clock {
        if !capture.is_dual_clock() && clock == ClockArg::Thread {
            warn!("Trace has no thread-time data; thread durations equal wall durations");
        }
        capture.set_clock_type(clock.into());
    }
    info!("Main thread: {}", capture.main_thread_id());

    let summary = summarize(&capture);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if !args.quiet {
            println!("cpu-capture v{}", env!("CARGO_PKG_VERSION"));
            println!("file: {}", args.trace.display());
        }
        print!("{summary}");
    }

    Ok(())
}
