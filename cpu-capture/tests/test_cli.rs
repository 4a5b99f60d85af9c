use std::process::Command;

fn cpu_capture() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cpu-capture"))
}

#[test]
fn test_cli_prints_text_summary() {
    let output = cpu_capture()
        .args(["tests/fixtures/simple_trace.json", "--quiet"])
        .output()
        .expect("Failed to run cpu-capture");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("Invalid UTF-8");
    assert!(stdout.contains("main thread: TID:100"));
    assert!(stdout.contains("duration: 8000us"));
    assert!(stdout.contains("RenderThread"));
}

#[test]
fn test_cli_json_summary_with_thread_clock() {
    let output = cpu_capture()
        .args(["tests/fixtures/simple_trace.json", "--json", "--clock", "thread", "--trace-id", "5"])
        .output()
        .expect("Failed to run cpu-capture");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    assert_eq!(parsed["trace_id"], 5);
    assert_eq!(parsed["clock"], "thread");
    assert_eq!(parsed["dual_clock"], true);
    assert_eq!(parsed["threads"][1]["duration_us"], 1000);
    assert_eq!(parsed["threads"][0]["node_count"], 5);
}

#[test]
fn test_cli_missing_file_fails() {
    let output = cpu_capture().arg("does-not-exist.json").output().expect("Failed to run cpu-capture");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load trace"));
}

#[test]
fn test_cli_without_trace_is_usage_error() {
    let output = cpu_capture().output().expect("Failed to run cpu-capture");
    assert_eq!(output.status.code(), Some(2));
}
