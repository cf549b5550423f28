//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an eqt command isolated from the caller's environment
pub fn eqt() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("eqt"));
    cmd.env_remove("EQT_AUTHOR")
        .env_remove("EQT_EDITOR")
        .env_remove("EQT_ENGINEER")
        .env_remove("EQT_LOG");
    cmd
}

/// Helper to get an eqt command running inside a test project
///
/// The user config directory points into the project so a developer's own
/// `config.yaml` never leaks into the test.
pub fn eqt_in(tmp: &TempDir) -> Command {
    let mut cmd = eqt();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".user-config"))
        .env("HOME", tmp.path());
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    eqt_in(&tmp).arg("init").assert().success();
    tmp
}

/// Helper to replace the project config entirely
pub fn write_config(tmp: &TempDir, yaml: &str) {
    fs::write(tmp.path().join(".eqt/config.yaml"), yaml).unwrap();
}

/// Helper to create a test service record, returning its ID
pub fn create_test_record(tmp: &TempDir, kind: &str, serial: &str, service_date: &str) -> String {
    let output = eqt_in(tmp)
        .args([
            "svc",
            "new",
            "--kind",
            kind,
            "--serial",
            serial,
            "--engineer",
            "Alice Brown",
            "--service-date",
            service_date,
            "--format",
            "id",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "svc new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Path of the record file for an ID
pub fn record_path(tmp: &TempDir, id: &str) -> PathBuf {
    tmp.path().join("records").join(format!("{}.eqt.yaml", id))
}

/// Count files in the records directory
pub fn count_records(tmp: &TempDir) -> usize {
    fs::read_dir(tmp.path().join("records"))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().to_string_lossy().ends_with(".eqt.yaml"))
                .count()
        })
        .unwrap_or(0)
}
