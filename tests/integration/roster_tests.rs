use scancheck::loader::{load_roster, HeaderPolicy, LoadOptions, RosterError, RosterFormat};
use scancheck::validator::MatchPolicy;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_csv_with_header_and_extra_columns() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "roster.csv",
        "Barcode,Item,Qty\n4006381333931,Pen,3\n  5901234123457 ,Pad,1\n4006381333931,Pen,2\n",
    );

    let loaded = load_roster(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.header.as_deref(), Some("Barcode"));
    assert_eq!(loaded.rows_read, 4);
    assert_eq!(loaded.codes, vec!["4006381333931", "5901234123457", "4006381333931"]);

    let roster = loaded.into_roster(MatchPolicy::exact());
    assert_eq!(roster.len(), 2);
    assert!(roster.contains("5901234123457"));
}

#[test]
fn test_header_policy_never_keeps_first_row() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.csv", "SKU-A\nSKU-B\n");

    // No digit, so auto detection takes it for a column title
    let auto = load_roster(&path, &LoadOptions::default()).unwrap();
    assert_eq!(auto.header.as_deref(), Some("SKU-A"));

    let options = LoadOptions {
        header: HeaderPolicy::Never,
        format: None,
    };
    assert_eq!(load_roster(&path, &options).unwrap().codes.len(), 2);

    let options = LoadOptions {
        header: HeaderPolicy::Always,
        format: None,
    };
    assert_eq!(load_roster(&path, &options).unwrap().codes, vec!["SKU-B"]);
}

#[test]
fn test_auto_header_detects_title_row() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.csv", "Item Code\nABC123\n");
    let loaded = load_roster(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.header.as_deref(), Some("Item Code"));
    assert_eq!(loaded.codes, vec!["ABC123"]);
}

#[test]
fn test_tsv_and_sniffed_txt() {
    let dir = TempDir::new().unwrap();
    let tsv = write(&dir, "roster.tsv", "code\tname\n111\tone\n222\ttwo\n");
    let txt = write(&dir, "roster.txt", "111\tone\n222\ttwo\n");

    assert_eq!(load_roster(&tsv, &LoadOptions::default()).unwrap().codes, vec!["111", "222"]);
    assert_eq!(load_roster(&txt, &LoadOptions::default()).unwrap().codes, vec!["111", "222"]);
}

#[test]
fn test_forced_format_overrides_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.dat", "111;x\n");
    let options = LoadOptions {
        header: HeaderPolicy::Never,
        format: Some(RosterFormat::Delimited(b';')),
    };
    assert_eq!(load_roster(&path, &options).unwrap().codes, vec!["111"]);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.pdf", "111\n");
    let err = load_roster(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RosterError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_roster(
        std::path::Path::new("/nonexistent/roster.csv"),
        &LoadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RosterError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/roster.csv"));
}

#[test]
fn test_header_only_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.csv", "Barcode\n");
    let err = load_roster(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RosterError::Empty));
}

#[test]
fn test_corrupt_spreadsheet_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.xlsx", "not a zip archive");
    let err = load_roster(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RosterError::Spreadsheet(_)));
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// Both workbooks hold the same first sheet: a "Barcode" title, a numeric
// EAN, text codes, a row with only column B filled, and a second sheet
// that must be ignored.
fn assert_fixture_roster(name: &str) {
    let loaded = load_roster(&fixture(name), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.header.as_deref(), Some("Barcode"));
    assert_eq!(loaded.codes, vec!["1234567890123", "ABC-001", "42", "00099"]);
    assert_eq!(loaded.rows_read, 6);
    assert_eq!(loaded.blank_cells, 1);

    let roster = loaded.into_roster(MatchPolicy::exact());
    assert!(roster.contains("1234567890123"));
    assert!(!roster.contains("1234567890123.0"));
    assert!(!roster.contains("9999999"));
}

#[test]
fn test_xlsx_fixture_first_sheet() {
    assert_fixture_roster("roster.xlsx");
}

#[test]
fn test_ods_fixture_first_sheet() {
    assert_fixture_roster("roster.ods");
}

#[test]
fn test_xlsx_fixture_header_never() {
    let options = LoadOptions {
        header: HeaderPolicy::Never,
        ..LoadOptions::default()
    };
    let loaded = load_roster(&fixture("roster.xlsx"), &options).unwrap();
    assert_eq!(loaded.header, None);
    assert_eq!(loaded.codes.first().map(String::as_str), Some("Barcode"));
    assert_eq!(loaded.codes.len(), 5);
}

#[test]
fn test_policy_collapses_variants() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roster.csv", "00123\n123\nabc9\nABC9\n");
    let loaded = load_roster(&path, &LoadOptions::default()).unwrap();

    let exact = loaded.clone().into_roster(MatchPolicy::exact());
    assert_eq!(exact.len(), 4);

    let relaxed = loaded.into_roster(MatchPolicy {
        case_insensitive: true,
        strip_leading_zeros: true,
    });
    assert_eq!(relaxed.len(), 2);
    assert!(relaxed.contains("0123"));
    assert!(relaxed.contains("Abc9"));
}
