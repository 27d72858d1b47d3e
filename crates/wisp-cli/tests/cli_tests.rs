//! End-to-end tests driving the `wisp` binary the way a user would.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn wisp_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wisp"))
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(wisp_bin());
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(wisp_bin());
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("wisp"));
}

#[test]
fn test_run_prints_program_output() {
    let mut cmd = Command::new(wisp_bin());
    cmd.arg("run").arg(fixtures_dir().join("hello.wisp"));
    cmd.assert().success().stdout(predicate::str::contains("hello from wisp"));
}

#[test]
fn test_run_reports_runtime_error() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("broken.wisp");
    std::fs::write(&script, "1 / 0\n").unwrap();

    let mut cmd = Command::new(wisp_bin());
    cmd.arg("run").arg(&script);
    cmd.assert().failure().stderr(predicate::str::contains("Runtime Error"));
}

#[test]
fn test_run_reports_missing_file() {
    let mut cmd = Command::new(wisp_bin());
    cmd.arg("run").arg("/nonexistent/path/script.wisp");
    cmd.assert().failure();
}
