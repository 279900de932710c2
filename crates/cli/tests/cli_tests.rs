//! CLI integration tests

use std::process::{Command, Output};

fn csc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csc"))
        .args(args)
        .env_remove("CSC_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = csc(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Cost Scanner"), "Should show app name");
    assert!(stdout.contains("report"), "Should show report command");
    assert!(stdout.contains("history"), "Should show history command");
    assert!(stdout.contains("scan"), "Should show scan command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = csc(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("csc"), "Should show binary name");
}

#[test]
fn test_history_help() {
    let output = csc(&["history", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "History help should succeed");
    assert!(stdout.contains("--limit"), "Should show limit option");
    assert!(stdout.contains("7"), "Should show default limit");
}

#[test]
fn test_global_options() {
    let output = csc(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("CSC_API_URL"), "Should show env var");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = csc(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

#[test]
fn test_invalid_limit() {
    let output = csc(&["history", "--limit", "many"]);

    assert!(!output.status.success(), "Non-numeric limit should fail");
}

#[test]
fn test_unreachable_daemon_fails() {
    let output = csc(&["--api-url", "http://127.0.0.1:9", "report"]);

    assert!(!output.status.success(), "Report should fail without a daemon");
}
