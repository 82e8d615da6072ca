//! Integration tests for the `retrievos` CLI binary.
//!
//! Parsing, help and error paths run without a dashboard. The end-to-end
//! cases point `--url` at a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `retrievos` binary with env isolation.
///
/// Clears all `RETRIEVOS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn retrievos_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("retrievos");
    cmd.env("HOME", "/tmp/retrievos-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/retrievos-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/retrievos-cli-test-nonexistent")
        .env_remove("RETRIEVOS_PROFILE")
        .env_remove("RETRIEVOS_URL")
        .env_remove("RETRIEVOS_OUTPUT")
        .env_remove("RETRIEVOS_INSECURE")
        .env_remove("RETRIEVOS_TIMEOUT")
        .env_remove("RETRIEVOS_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a prepared command off the async runtime so the mock server keeps serving.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = retrievos_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    retrievos_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("batches")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("timeline")),
    );
}

#[test]
fn test_version_flag() {
    retrievos_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("retrievos"));
}

#[test]
fn test_completions_bash() {
    retrievos_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("retrievos"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    retrievos_cmd().arg("frobnicate").assert().failure().code(2);
}

#[test]
fn test_invalid_output_format() {
    retrievos_cmd()
        .args(["-o", "xml", "batches"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_desc_requires_sort() {
    retrievos_cmd()
        .args(["--url", "http://127.0.0.1:9", "devices", "--desc"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_no_config_mentions_init() {
    let output = retrievos_cmd().arg("batches").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("config init"), "unexpected output:\n{text}");
}

#[test]
fn test_unknown_profile_is_not_found() {
    let output = retrievos_cmd()
        .args(["--profile", "nope", "batches"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_config_show_without_file() {
    retrievos_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_designation_lookup_is_offline() {
    retrievos_cmd()
        .args(["--url", "http://127.0.0.1:9", "-o", "plain", "designation", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MD"));
}

// ── Against a mock dashboard ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_batches_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batches": ["2024-02-01T00-00-00", "2024-01-01T00-00-00"]
        })))
        .mount(&server)
        .await;

    let mut cmd = retrievos_cmd();
    cmd.args(["--url", &server.uri(), "-o", "plain", "batches"]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "2024-02-01T00-00-00\n2024-01-01T00-00-00\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_csv_filtered_and_sorted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batch/2024-01-01/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                {"host": "sw-b", "model": "C9300",
                 "cve_counts": {"Critical": 1, "High": 0, "Medium": 0, "Low": 0}},
                {"host": "sw-a", "model": "C9300",
                 "cve_counts": {"Critical": 2, "High": 0, "Medium": 0, "Low": 0}},
                {"host": "rtr-1", "model": "ISR4331",
                 "cve_counts": {"Critical": 0, "High": 0, "Medium": 0, "Low": 3}}
            ]
        })))
        .mount(&server)
        .await;

    let mut cmd = retrievos_cmd();
    cmd.args([
        "--url",
        &server.uri(),
        "-o",
        "csv",
        "devices",
        "--batch",
        "2024-01-01",
        "--severity",
        "critical",
        "--sort",
        "host",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("host,alias_name,model,"));
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("sw-a,"));
    assert!(lines[2].starts_with("sw-b,"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_sort_key_is_usage_error() {
    let server = MockServer::start().await;

    let mut cmd = retrievos_cmd();
    cmd.args(["--url", &server.uri(), "devices", "--sort", "colour"]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("colour"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cves_for_missing_host_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batch/2024-01-01/cves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cves": [{"host": "sw-core-1", "cves": {"High": ["CVE-2023-20198"]}}]
        })))
        .mount(&server)
        .await;

    let mut cmd = retrievos_cmd();
    cmd.args([
        "--url",
        &server.uri(),
        "cves",
        "rtr-9",
        "--batch",
        "2024-01-01",
    ]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("No record for rtr-9"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_exits_general() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut cmd = retrievos_cmd();
    cmd.args(["--url", &server.uri(), "batches"]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(1));
}
