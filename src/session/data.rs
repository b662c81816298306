//! Data structures for saved scan sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::validator::{Counters, MatchPolicy, ScanRecord};

/// Current version of the session file format.
pub const SESSION_VERSION: u32 = 1;

/// A saved scan session.
///
/// Only the history is authoritative; counters and seen codes are rebuilt
/// from it on load. Cooldown state is never saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Format version.
    pub version: u32,
    /// When the session was saved.
    pub created_at: DateTime<Utc>,
    /// Roster file the scans were checked against.
    pub roster_path: Option<PathBuf>,
    /// Match policy in force while scanning.
    #[serde(default)]
    pub policy: MatchPolicy,
    /// Scan history in chronological order.
    pub records: Vec<ScanRecord>,
}

impl Session {
    /// Create a new session with current timestamp and default version.
    pub fn new(roster_path: Option<PathBuf>, policy: MatchPolicy, records: Vec<ScanRecord>) -> Self {
        Self {
            version: SESSION_VERSION,
            created_at: Utc::now(),
            roster_path,
            policy,
            records,
        }
    }

    /// Counters recomputed from the saved history.
    #[must_use]
    pub fn counters(&self) -> Counters {
        Counters::from_history(&self.records)
    }
}
