//! Scan history records and the counters derived from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a submitted scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// First scan of a roster code this session.
    Valid,
    /// Code is not on the roster.
    Invalid,
    /// Roster code that was already scanned.
    Duplicate,
}

impl Outcome {
    /// Lowercase name used in exports and session files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Valid => "valid",
            Outcome::Invalid => "invalid",
            Outcome::Duplicate => "duplicate",
        }
    }

    /// Whether downstream feedback should use the success cue.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Valid)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified scan attempt. History is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// The code as scanned, trimmed.
    pub barcode: String,
    /// When the scan was captured.
    pub timestamp: DateTime<Utc>,
    /// How the scan was classified.
    pub outcome: Outcome,
}

impl ScanRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(barcode: impl Into<String>, timestamp: DateTime<Utc>, outcome: Outcome) -> Self {
        Self {
            barcode: barcode.into(),
            timestamp,
            outcome,
        }
    }
}

/// Running totals over the scan history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Unique valid scans.
    pub valid: usize,
    /// Scans of codes not on the roster.
    pub invalid: usize,
    /// Repeat scans of already-accepted codes.
    pub duplicate: usize,
}

impl Counters {
    /// Recompute counters from a history log.
    #[must_use]
    pub fn from_history<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ScanRecord>,
    {
        records.into_iter().fold(Self::default(), |mut acc, record| {
            acc.record(record.outcome);
            acc
        })
    }

    /// Count one more outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Valid => self.valid += 1,
            Outcome::Invalid => self.invalid += 1,
            Outcome::Duplicate => self.duplicate += 1,
        }
    }

    /// Total number of recorded scans.
    #[must_use]
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.duplicate
    }
}

/// Snapshot of roster completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    /// Outcome totals.
    #[serde(flatten)]
    pub counters: Counters,
    /// Number of codes on the current roster.
    pub roster_size: usize,
    /// Roster codes that have been scanned.
    pub scanned: usize,
    /// Roster codes still waiting for a scan.
    pub remaining: usize,
}

impl Progress {
    /// Completion as a percentage in `0.0..=100.0`.
    ///
    /// An empty roster reports `0.0`.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        if self.roster_size == 0 {
            0.0
        } else {
            self.scanned as f64 / self.roster_size as f64 * 100.0
        }
    }

    /// Every roster code has been scanned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.roster_size > 0 && self.remaining == 0
    }
}
