//! Integration tests for CLI output behavior
//!
//! None of these reach the network: every command fails before the first API
//! call or talks to a closed local port. The default behavior is quiet (no
//! logs). Use -v/--verbose to enable logs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run purge in an isolated home and working directory with no credentials.
fn run_purge(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_purge"));
    command
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("CLOUDFLARE_API_TOKEN")
        .env_remove("CLOUDFLARE_ACCOUNT_ID")
        .env_remove("PURGE_API_BASE_URL")
        .env_remove("RUST_LOG");
    for (key, value) in envs {
        command.env(key, value);
    }
    command
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute 'purge {}': {}", args.join(" "), e))
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_delete_without_confirmation_is_refused() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["delete", "billing-svc"], &[]);

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("Refusing to delete 'billing-svc'"),
        "expected confirmation refusal, got: {}",
        stderr
    );
    assert!(stderr.contains("--yes"));
}

#[test]
fn test_plan_without_token_reports_missing_credentials() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["plan", "billing-svc"], &[]);

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("CLOUDFLARE_API_TOKEN"),
        "expected missing token message, got: {}",
        stderr
    );
}

#[test]
fn test_dry_run_does_not_require_confirmation() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["delete", "billing-svc", "--dry-run"], &[]);

    // Fails on credentials, not on the confirmation check
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(!stderr.contains("Refusing"));
    assert!(stderr.contains("CLOUDFLARE_API_TOKEN"));
}

/// Verify stdout carries no JSON logs and stderr has no INFO logs by default
#[test]
fn test_default_mode_is_quiet() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["plan", "billing-svc"], &[]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = stderr_of(&output);
    assert!(
        !stdout.contains(r#""event":"#),
        "stdout should not contain JSON logs, got: {}",
        stdout
    );
    assert!(
        !stderr.contains(r#""level":"INFO""#),
        "Default mode should not emit INFO logs, got: {}",
        stderr
    );
}

#[test]
fn test_verbose_flag_enables_logs() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["-v", "plan", "billing-svc"], &[]);

    let stderr = stderr_of(&output);
    assert!(
        stderr.contains(r#""level":"INFO""#),
        "Verbose mode should emit INFO logs, got: {}",
        stderr
    );
    assert!(stderr.contains("cli.plan_started"));
}

#[test]
fn test_missing_worker_argument_fails() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(dir.path(), &["plan"], &[]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("<worker>"));
}

#[test]
fn test_invalid_project_config_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".purge")).unwrap();
    fs::write(dir.path().join(".purge").join("config.toml"), "invalid toml [[[").unwrap();

    let output = run_purge(dir.path(), &["plan", "billing-svc"], &[]);

    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("Warning: Could not load config"),
        "expected config warning, got: {}",
        stderr
    );
    assert!(stderr.contains("CLOUDFLARE_API_TOKEN"));
}

#[test]
fn test_unreachable_api_fails_analysis() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(
        dir.path(),
        &["plan", "billing-svc", "--account-id", "acct-1", "--json"],
        &[
            ("CLOUDFLARE_API_TOKEN", "test-token"),
            ("PURGE_API_BASE_URL", "http://127.0.0.1:9/client/v4"),
        ],
    );

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("Failed to analyze worker 'billing-svc'"),
        "expected analysis failure, got: {}",
        stderr
    );
}

#[test]
fn test_verbose_connect_logs_account_id() {
    let dir = TempDir::new().unwrap();

    let output = run_purge(
        dir.path(),
        &["-v", "plan", "billing-svc", "--account-id", "acct-1"],
        &[
            ("CLOUDFLARE_API_TOKEN", "test-token"),
            ("PURGE_API_BASE_URL", "http://127.0.0.1:9/client/v4"),
        ],
    );

    let stderr = stderr_of(&output);
    let connected = stderr
        .lines()
        .find(|line| line.contains("cli.catalog_connected"))
        .unwrap_or_else(|| panic!("expected connect event, got: {}", stderr));
    assert!(connected.contains(r#""account_id":"acct-1""#));
}
