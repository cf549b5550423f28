//! Service record command tests

mod common;

use common::{
    count_records, create_test_record, eqt_in, record_path, setup_test_project, write_config,
};
use predicates::prelude::*;
use std::fs;

// ============================================================================
// svc new
// ============================================================================

#[test]
fn test_svc_new_issues_first_certificate() {
    let tmp = setup_test_project();

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "spot-welder",
            "--serial",
            "W-100",
            "--engineer",
            "Alice Brown",
            "--service-date",
            "2025-01-01",
            "--today",
            "2025-06-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SW-0001"))
        .stdout(predicate::str::contains("31/12/2025"))
        .stdout(predicate::str::contains("valid"));

    assert_eq!(count_records(&tmp), 1);
}

#[test]
fn test_svc_new_numbers_are_sequential_per_kind() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");
    create_test_record(&tmp, "spot-welder", "W-2", "2025-01-02");
    let lift = create_test_record(&tmp, "lift-equipment", "L-1", "2025-01-03");

    let content = fs::read_to_string(record_path(&tmp, &lift)).unwrap();
    assert!(content.contains("BWS-0001"));

    eqt_in(&tmp)
        .args(["svc", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SW-0001"))
        .stdout(predicate::str::contains("SW-0002"))
        .stdout(predicate::str::contains("BWS-0001"));
}

#[test]
fn test_svc_new_record_file_contents() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-100", "2025-01-01");
    assert!(id.starts_with("SVC-"));

    let content = fs::read_to_string(record_path(&tmp, &id)).unwrap();
    assert!(content.contains("certificate_number: SW-0001"));
    assert!(content.contains("2025-01-01"));
    assert!(content.contains("2025-12-31"));
    assert!(content.contains("Alice Brown"));
    // Status is derived, never stored on new records
    assert!(!content.contains("status:"));
}

#[test]
fn test_svc_new_rejects_engineer_not_on_roster() {
    let tmp = setup_test_project();
    write_config(&tmp, "engineers: [Alice Brown, Raj Singh]\n");

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "other",
            "--serial",
            "X-1",
            "--engineer",
            "Mallory",
            "--service-date",
            "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mallory"));

    assert_eq!(count_records(&tmp), 0);
}

#[test]
fn test_svc_new_accepts_roster_name_case_insensitively() {
    let tmp = setup_test_project();
    write_config(&tmp, "engineers: [Alice Brown]\n");

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "other",
            "--serial",
            "X-1",
            "--engineer",
            "alice brown",
            "--service-date",
            "2025-01-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("EQ-0001"));
}

#[test]
fn test_svc_new_retest_date_refused_when_locked() {
    let tmp = setup_test_project();

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "spot-welder",
            "--serial",
            "W-1",
            "--engineer",
            "Alice Brown",
            "--service-date",
            "2025-01-01",
            "--retest-date",
            "2025-06-30",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));

    assert_eq!(count_records(&tmp), 0);
}

#[test]
fn test_svc_new_retest_date_allowed_in_manual_mode() {
    let tmp = setup_test_project();
    write_config(&tmp, "retest:\n  mode: manual\n");

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "spot-welder",
            "--serial",
            "W-1",
            "--engineer",
            "Alice Brown",
            "--service-date",
            "2025-01-01",
            "--retest-date",
            "2025-06-30",
            "--today",
            "2025-06-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("30/06/2025"))
        .stdout(predicate::str::contains("upcoming"));
}

// ============================================================================
// svc list
// ============================================================================

#[test]
fn test_svc_list_empty() {
    let tmp = setup_test_project();

    eqt_in(&tmp)
        .args(["svc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No service records found"));
}

#[test]
fn test_svc_list_status_filter() {
    let tmp = setup_test_project();
    // Retest 31/12/2025: upcoming on 2025-12-01
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");
    // Retest 30/06/2026: valid on 2025-12-01
    create_test_record(&tmp, "spot-welder", "W-2", "2025-07-01");
    // Retest 30/11/2025: expired on 2025-12-01
    create_test_record(&tmp, "spot-welder", "W-3", "2024-12-01");

    eqt_in(&tmp)
        .args(["svc", "list", "--status", "upcoming", "--today", "2025-12-01", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    eqt_in(&tmp)
        .args(["svc", "list", "--status", "invalid", "--today", "2025-12-01", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W-3"))
        .stdout(predicate::str::contains("W-1").not());

    eqt_in(&tmp)
        .args(["svc", "list", "--status", "attention", "--today", "2025-12-01", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_svc_list_kind_filter_and_json() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");
    create_test_record(&tmp, "lift", "L-1", "2025-01-01");

    let output = eqt_in(&tmp)
        .args(["svc", "list", "--kind", "lift", "-f", "json", "--today", "2025-06-01"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["certificate"], "BWS-0001");
    assert_eq!(rows[0]["status"], "valid");
    assert_eq!(rows[0]["retest_date"], "31/12/2025");
}

#[test]
fn test_svc_list_sorted_by_retest_date() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "LATE", "2025-07-01");
    create_test_record(&tmp, "spot-welder", "EARLY", "2025-01-01");

    let output = eqt_in(&tmp)
        .args(["svc", "list", "-f", "csv"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let early = stdout.find("EARLY").unwrap();
    let late = stdout.find("LATE").unwrap();
    assert!(early < late);
}

#[test]
fn test_svc_list_ids() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");

    eqt_in(&tmp)
        .args(["svc", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", id));
}

// ============================================================================
// svc show
// ============================================================================

#[test]
fn test_svc_show_by_certificate_number() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-100", "2025-01-01");

    eqt_in(&tmp)
        .args(["svc", "show", "SW-0001", "--today", "2026-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W-100"))
        .stdout(predicate::str::contains("31/12/2025"))
        .stdout(predicate::str::contains("5 days ago"))
        .stdout(predicate::str::contains("expired"));
}

#[test]
fn test_svc_show_by_id_prefix() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-100", "2025-01-01");

    eqt_in(&tmp)
        .args(["svc", "show", &id[..12]])
        .assert()
        .success()
        .stdout(predicate::str::contains("SW-0001"));
}

#[test]
fn test_svc_show_unknown_fails() {
    let tmp = setup_test_project();

    eqt_in(&tmp)
        .args(["svc", "show", "SW-9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SW-9999"));
}

#[test]
fn test_svc_show_flags_stale_cached_status() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-100", "2025-01-01");

    let path = record_path(&tmp, &id);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("status: valid\n");
    fs::write(&path, content).unwrap();

    eqt_in(&tmp)
        .args(["svc", "show", "SW-0001", "--today", "2026-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out of date"));
}

// ============================================================================
// svc set-service-date / set-retest-date / clear-override
// ============================================================================

#[test]
fn test_set_service_date_moves_retest() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");

    eqt_in(&tmp)
        .args(["svc", "set-service-date", "SW-0001", "2025-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("28/02/2026"));

    let content = fs::read_to_string(record_path(&tmp, &id)).unwrap();
    assert!(content.contains("2026-02-28"));
    assert!(content.contains("entity_revision: 2"));
}

#[test]
fn test_set_retest_date_requires_manual_mode() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");

    eqt_in(&tmp)
        .args(["svc", "set-retest-date", "SW-0001", "2025-08-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn test_manual_override_and_clear() {
    let tmp = setup_test_project();
    let id = create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");
    write_config(&tmp, "retest:\n  mode: manual\n");

    eqt_in(&tmp)
        .args(["svc", "set-retest-date", "SW-0001", "2025-08-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("01/08/2025"));

    let content = fs::read_to_string(record_path(&tmp, &id)).unwrap();
    assert!(content.contains("retest_override: true"));

    eqt_in(&tmp)
        .args(["svc", "set-retest-date", "SW-0001", "2024-12-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("earlier"));

    eqt_in(&tmp)
        .args(["svc", "clear-override", "SW-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("31/12/2025"));

    let content = fs::read_to_string(record_path(&tmp, &id)).unwrap();
    assert!(!content.contains("retest_override"));
}

// ============================================================================
// svc refresh-status
// ============================================================================

#[test]
fn test_refresh_status_rewrites_only_cached_fields() {
    let tmp = setup_test_project();
    let cached = create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");
    let plain = create_test_record(&tmp, "spot-welder", "W-2", "2025-01-01");

    let path = record_path(&tmp, &cached);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("status: valid\n");
    fs::write(&path, content).unwrap();

    eqt_in(&tmp)
        .args(["svc", "refresh-status", "--today", "2026-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshed 1"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("status: expired"));

    let untouched = fs::read_to_string(record_path(&tmp, &plain)).unwrap();
    assert!(!untouched.contains("status:"));
}

// ============================================================================
// svc edit
// ============================================================================

#[test]
fn test_svc_edit_reports_failing_editor() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");

    eqt_in(&tmp)
        .env("EQT_EDITOR", "false")
        .args(["svc", "edit", "SW-0001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed"));
}

#[test]
fn test_svc_edit_with_successful_editor() {
    let tmp = setup_test_project();
    create_test_record(&tmp, "spot-welder", "W-1", "2025-01-01");

    eqt_in(&tmp)
        .env("EQT_EDITOR", "true")
        .args(["svc", "edit", "SW-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opening SW-0001"));
}

// ============================================================================
// Config checks
// ============================================================================

#[test]
fn test_negative_retest_interval_is_rejected() {
    let tmp = setup_test_project();
    write_config(&tmp, "retest:\n  interval_days: -30\n");

    eqt_in(&tmp)
        .args([
            "svc",
            "new",
            "--kind",
            "spot-welder",
            "--serial",
            "W-1",
            "--engineer",
            "Alice Brown",
            "--service-date",
            "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_days"));

    assert_eq!(count_records(&tmp), 0);
}

#[test]
fn test_oversized_retest_interval_does_not_panic() {
    let tmp = setup_test_project();
    write_config(&tmp, "retest:\n  interval_days: 1000000000000000\n");

    eqt_in(&tmp)
        .args(["svc", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_days"))
        .stderr(predicate::str::contains("panicked").not());
}
