//! CLI integration tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn bench_analyzer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bench-analyzer"))
        .args(args)
        .env_remove("BENCH_ANALYZER_CONFIG")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

/// Two runs: a hey run with controller logs and a JMeter run without them
fn create_runs(root: &Path) {
    let hey = root.join("hey-knative-10rps");
    fs::create_dir_all(&hey).unwrap();
    fs::write(
        hey.join("hey.1.csv"),
        "response-time,status-code,offset\n\
         0.010,200,0.10\n0.020,200,0.50\n0.040,200,0.90\n\
         0.030,200,1.20\n0.050,200,1.70\n",
    )
    .unwrap();
    fs::write(
        hey.join("dates.txt"),
        "2020-05-01 10:00:00\n2020-05-01 10:01:00\n",
    )
    .unwrap();
    fs::write(
        hey.join("log.txt"),
        concat!(
            "{\"ts\":\"2020-05-01T10:00:05.100Z\",\"msg\":\"PodCount=1 ObservedStableValue=4\"}\n",
            "not json at all\n",
            "{\"ts\":\"2020-05-01T10:00:06.100Z\",\"msg\":\"PodCount=3 ObservedStableValue=8\"}\n",
        ),
    )
    .unwrap();

    let jmeter = root.join("jmeter-10rps");
    fs::create_dir_all(&jmeter).unwrap();
    fs::write(
        jmeter.join("results.csv"),
        "timeStamp,elapsed,Latency\n1588327200100,5,12\n1588327200500,7,18\n",
    )
    .unwrap();
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = bench_analyzer(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("analyze"), "Should show analyze command");
    assert!(stdout.contains("inspect"), "Should show inspect command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = bench_analyzer(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("bench-analyzer"), "Should show binary name");
}

/// Test analyze subcommand help
#[test]
fn test_analyze_help() {
    let output = bench_analyzer(&["analyze", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--output"), "Should show output option");
    assert!(stdout.contains("--jobs"), "Should show jobs option");
    assert!(
        stdout.contains("--on-malformed-record"),
        "Should show malformed record option"
    );
}

/// Test JSON output of a full analysis
#[test]
fn test_analyze_json_output() {
    let root = TempDir::new().unwrap();
    create_runs(root.path());

    let output = bench_analyzer(&[
        "--format",
        "json",
        "analyze",
        root.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "analyze should succeed");

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);

    let hey = &reports[0];
    assert_eq!(hey["name"], "hey-knative-10rps");
    assert_eq!(hey["requests"]["status"], "completed");
    assert_eq!(hey["requests"]["series"]["counts"], serde_json::json!([2, 1]));
    assert_eq!(hey["controller"]["status"], "completed");
    assert_eq!(
        hey["controller"]["series"]["pod_counts"],
        serde_json::json!([1.0, 3.0])
    );
    assert_eq!(hey["diagnostics"]["skipped_lines"], 1);

    let jmeter = &reports[1];
    assert_eq!(jmeter["dialect"], "timestamp");
    assert_eq!(jmeter["requests"]["series"]["counts"], serde_json::json!([2]));
    assert_eq!(jmeter["controller"]["status"], "failed");
}

/// Test that series files are exported
#[test]
fn test_analyze_exports_series() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create_runs(root.path());

    let metrics = out.path().join("metrics.prom");
    let output = bench_analyzer(&[
        "analyze",
        root.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--metrics-out",
        metrics.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "analyze should succeed");

    let requests = fs::read_to_string(out.path().join("hey-knative-10rps-requests.csv")).unwrap();
    assert!(requests.starts_with("window,count,mean_latency_ms\n"));
    assert!(out.path().join("hey-knative-10rps-controller.csv").exists());
    assert!(out.path().join("jmeter-10rps-requests.csv").exists());
    assert!(!out.path().join("jmeter-10rps-controller.csv").exists());
    assert!(out.path().join("jmeter-10rps.json").exists());

    let prom = fs::read_to_string(&metrics).unwrap();
    assert!(prom.contains("bench_analyzer_files_parsed_total"));
}

/// Test inspect on a single run directory
#[test]
fn test_inspect_json_output() {
    let root = TempDir::new().unwrap();
    create_runs(root.path());
    let run = root.path().join("jmeter-10rps");

    let output = bench_analyzer(&["--format", "json", "inspect", run.to_str().unwrap()]);
    assert!(output.status.success(), "inspect should succeed");

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["requests"]["series"]["means"], serde_json::json!([15.0]));
}

/// Test inspect on a path that is not a directory
#[test]
fn test_inspect_missing_directory() {
    let output = bench_analyzer(&["inspect", "/nonexistent/run"]);
    assert!(!output.status.success());
}
