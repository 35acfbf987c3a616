//! Exit codes and output of the `format-bench` binary.

use std::process::{Command, Output};

fn format_bench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_format-bench"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn list_prints_formats_in_order() {
    let out = format_bench(&["list"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        names,
        vec!["protobuf", "avro", "bson", "cbor", "ion", "msgpack", "json", "bincode"]
    );
}

#[test]
fn json_report_for_selected_formats() {
    let out = format_bench(&[
        "--iterations",
        "20",
        "--warmup-iterations",
        "2",
        "--output",
        "json",
        "--format",
        "json,cbor",
    ]);
    assert_eq!(out.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let entries = report["entries"].as_array().unwrap();
    let keys: Vec<(String, String)> = entries
        .iter()
        .map(|e| {
            (
                e["format"].as_str().unwrap().to_string(),
                e["operation"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("cbor".to_string(), "encode".to_string()),
            ("cbor".to_string(), "decode".to_string()),
            ("json".to_string(), "encode".to_string()),
            ("json".to_string(), "decode".to_string()),
        ]
    );
    for e in entries {
        assert_eq!(e["status"], "ok");
        assert_eq!(e["samples"], 20);
        assert!(e["mean_bytes_allocated"].is_number());
    }
    assert_eq!(report["run"]["allocation_tracking"], true);
}

#[test]
fn table_output_lists_every_row() {
    let out = format_bench(&["run", "--iterations", "10", "--warmup-iterations", "0"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("format"));
    // Header plus one row per (format, operation).
    let rows = stdout.lines().take_while(|l| !l.is_empty()).count();
    assert_eq!(rows, 1 + 8 * 2);
}

#[test]
fn unknown_format_is_a_config_error() {
    let out = format_bench(&["--format", "yaml"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn zero_iterations_is_a_config_error() {
    let out = format_bench(&["--iterations", "0"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn excessive_iterations_is_a_config_error() {
    for n in ["100000000000", "18446744073709551615"] {
        let out = format_bench(&["--iterations", n, "--format", "json"]);
        assert_eq!(out.status.code(), Some(1), "--iterations {n}");
        assert!(out.stdout.is_empty());
    }
}

#[test]
fn unknown_flag_is_a_config_error() {
    let out = format_bench(&["--no-such-flag"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn expired_timeout_exits_with_two_and_partial_report() {
    let out = format_bench(&["--timeout", "0s", "--iterations", "5", "--output", "json"]);
    assert_eq!(out.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["run"]["timed_out"], true);
    assert!(report["entries"].as_array().unwrap().is_empty());
}

#[test]
fn verify_passes_for_builtin_formats() {
    let out = format_bench(&["verify"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().filter(|l| l.starts_with("ok")).count(), 8);
}

#[test]
fn out_writes_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let out = format_bench(&[
        "--iterations",
        "5",
        "--format",
        "protobuf",
        "--output",
        "json",
        "--out",
        path.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["entries"].as_array().unwrap().len(), 2);
    assert_eq!(report["entries"][0]["payload_bytes"], 19);
}
