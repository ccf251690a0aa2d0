//! CLI options interaction tests
//!
//! These tests run the compiled binary and check exit codes, usage guidance
//! and report output.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

const ENV_VARS: [&str; 5] = ["TARGET_URL", "TOTAL_REQUESTS", "CONCURRENCY", "TIMEOUT_SECONDS", "ENABLE_COLOR"];

/// Helper function to create a test command isolated from the caller's environment
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("stress-test").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Helper function to create a temporary directory holding a .env file
fn create_temp_env(content: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".env"), content).unwrap();
    temp_dir
}

#[test]
fn test_missing_parameters_print_usage() {
    create_test_cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing required parameter --url"))
        .stderr(predicate::str::contains("Usage: stress-test"))
        .stdout(predicate::str::is_empty());

    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "--concurrency", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--requests"));
}

#[test]
fn test_non_positive_values_are_rejected() {
    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "--requests", "0", "--concurrency", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--requests must be greater than 0"));

    create_test_cmd()
        .args(["--url=http://127.0.0.1:1/", "--requests=-5", "--concurrency=2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage: stress-test"));

    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "-n", "2", "-c", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--concurrency"));
}

#[test]
fn test_oversized_counts_are_rejected() {
    create_test_cmd()
        .args(["--url=http://127.0.0.1:1/", "--requests=18446744073709551615", "--concurrency=2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--requests cannot exceed"))
        .stdout(predicate::str::is_empty());

    create_test_cmd()
        .args(["--url=http://127.0.0.1:1/", "--requests=2", "--concurrency=1000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--concurrency cannot exceed"));
}

#[test]
fn test_invalid_url_is_config_error() {
    create_test_cmd()
        .args(["--url", "not a url", "-n", "1", "-c", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid target URL"));
}

#[test]
fn test_invalid_timeout_error() {
    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "-n", "1", "-c", "1", "--timeout", "0"])
        .assert()
        .code(1);
}

#[test]
fn test_help_output() {
    create_test_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--requests"))
        .stdout(predicate::str::contains("--concurrency"));
}

#[test]
fn test_version_output() {
    create_test_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unreachable_target_still_reports() {
    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "-n", "3", "-c", "3", "-t", "2", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total requests:      3"))
        .stdout(predicate::str::contains("Successful requests: 0"))
        .stdout(predicate::str::contains("Failed requests:     3"))
        .stdout(predicate::str::contains("Min duration:        n/a"))
        .stdout(predicate::str::contains("Avg duration:        0.00 ms"))
        .stdout(predicate::str::contains("Transport errors: 3"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(10)
        .mount(&server)
        .await;

    create_test_cmd()
        .args(["--url", &server.uri(), "--requests", "10", "--concurrency", "3", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successful requests: 10"))
        .stdout(predicate::str::contains("[200] 10 responses (100.00%)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let output = create_test_cmd()
        .args(["--url", &server.uri(), "-n", "4", "-c", "2", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_requests"], 4);
    assert_eq!(json["failed_requests"], 4);
    assert_eq!(json["status_codes"]["503"]["count"], 4);
    assert!(json["min_duration_ms"].is_null());
}

#[test]
fn test_environment_configuration() {
    let temp_dir = create_temp_env("TARGET_URL=http://127.0.0.1:1/\nTOTAL_REQUESTS=2\nCONCURRENCY=2\nTIMEOUT_SECONDS=2\n");

    create_test_cmd()
        .current_dir(temp_dir.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total requests:      2"));

    // Command line wins over the .env file
    create_test_cmd()
        .current_dir(temp_dir.path())
        .args(["--requests", "1", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total requests:      1"));
}

#[test]
fn test_malformed_env_value_is_config_error() {
    let temp_dir = create_temp_env("TOTAL_REQUESTS=many\n");

    create_test_cmd()
        .current_dir(temp_dir.path())
        .args(["--url", "http://127.0.0.1:1/", "-c", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TOTAL_REQUESTS"));
}

#[test]
fn test_verbose_output_shows_run_metadata() {
    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "-n", "1", "-c", "4", "-t", "2", "--verbose", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target URL:"))
        .stdout(predicate::str::contains("Run ID:"))
        .stderr(predicate::str::contains("3 workers will exit without sending a request"));
}

#[test]
fn test_env_example_output() {
    create_test_cmd()
        .arg("--env-example")
        .assert()
        .success()
        .stdout(predicate::str::contains("# HTTP Stress Tester Configuration"))
        .stdout(predicate::str::contains("# TOTAL_REQUESTS="))
        .stdout(predicate::str::contains("# CONCURRENCY="))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_debug_output_shows_command_line_summary() {
    create_test_cmd()
        .args(["--url", "http://127.0.0.1:1/", "-n", "1", "-c", "1", "-t", "2", "--debug", "--no-color"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Command Line:"))
        .stderr(predicate::str::contains("  Timeout: 2s"));
}
