use chrono::{DateTime, TimeDelta, Utc};
use scancheck::feedback::NullFeedback;
use scancheck::scan::{ScanOptions, ScanRunner};
use scancheck::source::{Clock, IterSource, LineSource, Frame};
use scancheck::validator::{
    CooldownScope, Counters, MatchPolicy, Outcome, Roster, ScanValidator, SharedValidator,
    Submission, ValidatorConfig,
};
use std::fs;
use std::io::{BufReader, Cursor, Read};
use std::time::Duration;
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_557_600, 0).unwrap()
}

fn roster(codes: &[&str]) -> Roster {
    Roster::from_codes(codes, MatchPolicy::exact())
}

#[derive(Debug, Clone, Copy)]
struct FrozenClock;

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        t0()
    }
}

#[test]
fn test_roster_scenario_three_second_spacing() {
    let mut validator = ScanValidator::with_roster(ValidatorConfig::default(), roster(&["A1", "B2"]));

    let outcomes: Vec<_> = ["A1", "A1", "Z9", "B2"]
        .iter()
        .enumerate()
        .map(|(i, code)| validator.submit(code, t0() + TimeDelta::seconds(3 * i as i64)))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            Submission::Recorded(Outcome::Valid),
            Submission::Recorded(Outcome::Duplicate),
            Submission::Recorded(Outcome::Invalid),
            Submission::Recorded(Outcome::Valid),
        ]
    );
    assert_eq!(
        validator.counters(),
        Counters {
            valid: 2,
            invalid: 1,
            duplicate: 1
        }
    );
    assert_eq!(validator.history().len(), 4);
    assert!(validator.progress().is_complete());
}

#[test]
fn test_replayed_frames_use_their_own_timestamps() {
    let input = "\
2024-05-01T10:00:00Z\tA1
2024-05-01T10:00:00.500Z\tA1
2024-05-01T10:00:01Z\tB2\tZ9
2024-05-01T10:00:05Z\tA1
";
    let shared = SharedValidator::new(ScanValidator::with_roster(
        ValidatorConfig::default(),
        roster(&["A1", "B2", "C3"]),
    ));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());
    let report = runner.run(LineSource::new(Cursor::new(input), FrozenClock));

    let history = shared.history();
    let summary: Vec<_> = history
        .iter()
        .map(|r| (r.barcode.as_str(), r.outcome))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A1", Outcome::Valid),
            ("B2", Outcome::Valid),
            ("Z9", Outcome::Invalid),
            ("A1", Outcome::Duplicate),
        ]
    );
    assert_eq!(report.suppressed, 1);
    assert_eq!(report.progress.remaining, 1);
    assert_eq!(history[1].timestamp, history[2].timestamp);
}

#[test]
fn test_console_commands_in_input() {
    let input = "A1\n:stats\n:clear\n\nB2\n";
    let shared = SharedValidator::new(ScanValidator::with_roster(
        ValidatorConfig::default(),
        roster(&["A1", "B2"]),
    ));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());
    let report = runner.run(LineSource::new(Cursor::new(input), FrozenClock));

    let history = shared.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].barcode, "B2");
    assert_eq!(report.frames, 3);
}

#[test]
fn test_commands_disabled_are_plain_codes() {
    let input = ":clear\n";
    let shared = SharedValidator::new(ScanValidator::new(ValidatorConfig::default()));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());
    runner.run(LineSource::new(Cursor::new(input), FrozenClock).with_commands(false));

    assert_eq!(shared.counters().invalid, 1);
}

#[test]
fn test_reload_mid_scan_keeps_history() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.txt");
    fs::write(&path, "A1\n").unwrap();

    let shared = SharedValidator::new(ScanValidator::with_roster(
        ValidatorConfig::default(),
        roster(&["A1"]),
    ));
    let options = ScanOptions {
        roster_path: Some(path.clone()),
        ..ScanOptions::default()
    };
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, options);

    runner.run(IterSource::new(vec![Frame::single(t0(), "A1")]));
    fs::write(&path, "B2\n").unwrap();
    runner.apply_control(scancheck::source::Control::ReloadRoster);
    runner.run(IterSource::new(vec![
        Frame::single(t0() + TimeDelta::seconds(10), "A1"),
        Frame::single(t0() + TimeDelta::seconds(20), "B2"),
    ]));

    let outcomes: Vec<_> = shared.history().iter().map(|r| r.outcome).collect();
    // A1 was accepted before the reload; it is no longer on the roster
    assert_eq!(outcomes, vec![Outcome::Valid, Outcome::Invalid, Outcome::Valid]);
    assert!(shared.with(|v| v.is_seen("A1")));
}

#[test]
fn test_global_cooldown_across_codes() {
    let config = ValidatorConfig::default()
        .with_cooldown(Duration::from_secs(1))
        .with_cooldown_scope(CooldownScope::Global);
    let shared = SharedValidator::new(ScanValidator::with_roster(config, roster(&["A1", "B2"])));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());

    let report = runner.run(IterSource::new(vec![
        Frame::single(t0(), "A1"),
        Frame::single(t0() + TimeDelta::milliseconds(400), "B2"),
        Frame::single(t0() + TimeDelta::milliseconds(1000), "B2"),
    ]));

    assert_eq!(report.suppressed, 1);
    assert_eq!(shared.counters().valid, 2);
}

#[test]
fn test_undecodable_line_is_filtered_not_fatal() {
    let shared = SharedValidator::new(ScanValidator::with_roster(
        ValidatorConfig::default(),
        roster(&["A1", "B2"]),
    ));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());
    let input = Cursor::new(b"A1\n\xff\xfe\nB2\n".to_vec());
    let report = runner.run(LineSource::new(input, FrozenClock));

    let summary: Vec<_> = shared
        .history()
        .iter()
        .map(|r| (r.barcode.clone(), r.outcome))
        .collect();
    assert_eq!(
        summary,
        vec![("A1".to_string(), Outcome::Valid), ("B2".to_string(), Outcome::Valid)]
    );
    assert_eq!(report.filtered, 1);
    assert!(!report.source_failed);
    assert!(report.progress.is_complete());
}

struct BrokenPipe;

impl Read for BrokenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "scanner unplugged"))
    }
}

#[test]
fn test_read_error_stops_the_scan() {
    let shared = SharedValidator::new(ScanValidator::with_roster(
        ValidatorConfig::default(),
        roster(&["A1"]),
    ));
    let runner = ScanRunner::new(shared.clone(), &NullFeedback, ScanOptions::default());
    let report = runner.run(LineSource::new(BufReader::new(BrokenPipe), FrozenClock));

    assert!(report.source_failed);
    assert!(shared.history().is_empty());
}
