//! CLI integration tests

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

const HEADER: &str = "date_created,name,cluster,replicas,namespace,container_spec,commodity,\
resize_direction,current_value,new_value,change,units,action_description,action_category,\
risk_description,action_mode,user_account,execution_datetime,execution_status,execution_error,tags";

fn cca(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cca"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CCA_CONFIG")
        .output()
        .expect("Failed to execute command")
}

fn export_row(created: &str, name: &str, cluster: &str, commodity: &str, current: u64, new: u64, status: &str) -> String {
    format!(
        "{created},{name},{cluster},2,shop,app,{commodity},Upsize,{current},{new},,mCores,\
Resize {name},Efficiency,,AUTOMATIC,admin,{created},{status},,"
    )
}

/// Write a small export with a failed action and one malformed row
fn sample_export() -> NamedTempFile {
    let rows = [
        HEADER.to_string(),
        export_row("01 Sep 2025 10:00", "api", "Kubernetes-prod", "VCPURequest", 500, 600, "SUCCEEDED"),
        export_row("02 Sep 2025 10:00", "api", "Kubernetes-prod", "VCPURequest", 600, 500, "SUCCEEDED"),
        export_row("03 Sep 2025 10:00", "api", "Kubernetes-prod", "VCPURequest", 500, 800, "SUCCEEDED"),
        export_row("11 Sep 2025 10:00", "web", "Kubernetes-dev", "VMem", 1048576, 2097152, "SUCCEEDED"),
        export_row("12 Sep 2025 10:00", "ghost", "Kubernetes-prod", "VCPU", 100, 900, "FAILED"),
        export_row("not a date", "broken", "Kubernetes-prod", "VCPU", 1, 2, "SUCCEEDED"),
    ];
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = cca(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Commodity Change Analyzer"), "Should show app name");
    assert!(stdout.contains("summary"), "Should show summary command");
    assert!(stdout.contains("buckets"), "Should show buckets command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = cca(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("cca"), "Should show binary name");
}

/// Test summary subcommand help
#[test]
fn test_summary_help() {
    let output = cca(&["summary", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for flag in ["--cluster", "--namespace", "--from", "--to", "--conservative", "--show-all", "--output-csv"] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

#[test]
fn test_summary_report_and_csv() {
    let export = sample_export();
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("summary.csv");

    let output = cca(&["summary", path_str(export.path()), "-c", path_str(&csv_path)]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "summary should succeed: {:?}", output);
    assert!(stdout.contains("COMMODITY CHANGE ANALYSIS REPORT"));
    assert!(stdout.contains("Total Workloads: 2"));
    assert!(!stdout.contains("ghost"), "Failed actions must not be reported");

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("cluster,namespace,workload,replicas,VCPU_old"));
    // api: VCPURequest 500 -> 800, 2 replicas
    assert!(lines[1].starts_with("Kubernetes-prod,shop,api,no change,,,,,,,500,800,300,60.00,2.00,600,"));
}

#[test]
fn test_summary_cluster_filter_and_json() {
    let export = sample_export();
    let output = cca(&["summary", path_str(export.path()), "--cluster", "dev", "--format", "json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["key"]["workload"], "web");
}

#[test]
fn test_summary_conservative_mode() {
    let export = sample_export();
    let output = cca(&[
        "summary",
        path_str(export.path()),
        "--conservative",
        "--conservative-days",
        "5",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["key"]["workload"], "web");
}

#[test]
fn test_buckets_export_and_report() {
    let export = sample_export();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buckets.csv");
    let report = dir.path().join("report.txt");

    let output = cca(&[
        "buckets",
        path_str(export.path()),
        "-o",
        path_str(&out),
        "-r",
        path_str(&report),
        "--bucket-size",
        "7d",
    ]);
    assert!(output.status.success(), "buckets should succeed: {:?}", output);

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "from,to,VCPU,VCPURequest,VMem,VMemRequest");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2025-09-01 10:00,2025-09-08 10:00,0,300,0,0");
    assert_eq!(lines[2], "2025-09-08 10:00,2025-09-15 10:00,0,0,1048576,0");

    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.contains("Total Buckets: 2"));
    assert!(text.contains("VCPURequest: +300 mc"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");
    let output = cca(&["summary", path_str(&missing)]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.csv"));
}

#[test]
fn test_invalid_filter_date_fails() {
    let export = sample_export();
    let output = cca(&["summary", path_str(export.path()), "--from", "yesterday"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("yesterday"));
}

#[test]
fn test_huge_conservative_lookback_keeps_everything() {
    let export = sample_export();
    let output = cca(&[
        "summary",
        path_str(export.path()),
        "--conservative",
        "--conservative-days",
        "4000000000",
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "summary should succeed: {:?}", output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["report"]["gate"]["lookback_days"], 4000000000u64);
}

#[test]
fn test_out_of_range_bucket_sizes_fail_cleanly() {
    let export = sample_export();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buckets.csv");
    for size in ["100000000", "500us"] {
        let output = cca(&["buckets", path_str(export.path()), "-o", path_str(&out), "--bucket-size", size]);
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert_eq!(output.status.code(), Some(1), "size {} should fail: {}", size, stderr);
        assert!(stderr.contains("invalid bucket size"), "unexpected error: {}", stderr);
    }
}

#[test]
fn test_invalid_bucket_size_fails() {
    let export = sample_export();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buckets.csv");
    let output = cca(&["buckets", path_str(export.path()), "-o", path_str(&out), "--bucket-size", "0"]);

    assert!(!output.status.success());
}
