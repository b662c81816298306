use chrono::{DateTime, TimeDelta, Utc};
use scancheck::output::{export_to_file, write_export, ExportFormat};
use scancheck::session::Session;
use scancheck::validator::{
    MatchPolicy, Outcome, Roster, ScanValidator, Submission, ValidatorConfig,
};
use std::fs;
use tempfile::TempDir;

fn t(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_557_600, 0).unwrap() + TimeDelta::seconds(secs)
}

fn scanned_validator() -> ScanValidator {
    let roster = Roster::from_codes(["A1", "B2", "C3"], MatchPolicy::exact());
    let mut validator = ScanValidator::with_roster(ValidatorConfig::default(), roster);
    validator.submit("A1", t(0));
    validator.submit("Z9", t(3));
    validator.submit("A1", t(6));
    validator
}

#[test]
fn test_resume_continues_where_session_left_off() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let validator = scanned_validator();
    Session::new(None, MatchPolicy::exact(), validator.history().to_vec())
        .save(&path)
        .unwrap();

    let session = Session::load(&path).unwrap();
    let roster = Roster::from_codes(["A1", "B2", "C3"], session.policy);
    let mut resumed = ScanValidator::restore(ValidatorConfig::default(), roster, session.records);

    assert_eq!(resumed.counters(), validator.counters());
    assert!(resumed.is_seen("A1"));
    // Cooldown starts empty, and A1 stays a duplicate
    assert_eq!(resumed.submit("A1", t(7)), Submission::Recorded(Outcome::Duplicate));
    assert_eq!(resumed.submit("B2", t(8)), Submission::Recorded(Outcome::Valid));
    assert_eq!(resumed.progress().remaining, 1);
}

#[test]
fn test_csv_export_columns_and_order() {
    let validator = scanned_validator();
    let mut out = Vec::new();
    write_export(&mut out, ExportFormat::Csv, validator.history(), validator.progress()).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "barcode,outcome,timestamp");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("A1,valid,2024-05-01T10:00:00"));
    assert!(lines[2].starts_with("Z9,invalid,"));
    assert!(lines[3].starts_with("A1,duplicate,"));
}

#[test]
fn test_json_export_file_has_summary() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let validator = scanned_validator();

    export_to_file(&path, ExportFormat::Json, validator.history(), validator.progress()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["summary"]["valid"], 1);
    assert_eq!(value["summary"]["invalid"], 1);
    assert_eq!(value["summary"]["duplicate"], 1);
    assert_eq!(value["summary"]["remaining"], 2);
    assert_eq!(value["records"].as_array().unwrap().len(), 3);
    assert_eq!(value["records"][2]["outcome"], "duplicate");
}

#[test]
fn test_empty_history_exports_header_only() {
    let validator = ScanValidator::new(ValidatorConfig::default());
    let mut out = Vec::new();
    write_export(&mut out, ExportFormat::Csv, validator.history(), validator.progress()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim_end(), "barcode,outcome,timestamp");
}

#[test]
fn test_session_rejects_edited_history() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    Session::new(None, MatchPolicy::exact(), scanned_validator().history().to_vec())
        .save(&path)
        .unwrap();

    let edited = fs::read_to_string(&path).unwrap().replace("\"invalid\"", "\"valid\"");
    fs::write(&path, edited).unwrap();

    let err = Session::load(&path).unwrap_err();
    assert!(err.to_string().contains("checksum mismatch"));
}
