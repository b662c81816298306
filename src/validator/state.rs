//! The scan validation and deduplication state machine.
//!
//! A [`ScanValidator`] owns one session: the roster, the set of codes already
//! accepted, the outcome counters, the append-only history, and the cooldown
//! map. Callers supply the timestamp of every scan, so the validator never
//! reads a clock and elapsed time can be simulated in tests.
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, TimeDelta};
//! use scancheck::validator::{MatchPolicy, Outcome, Roster, ScanValidator, Submission, ValidatorConfig};
//!
//! let roster = Roster::from_codes(["A1", "B2"], MatchPolicy::exact());
//! let mut validator = ScanValidator::with_roster(ValidatorConfig::default(), roster);
//!
//! let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
//! assert_eq!(validator.submit("A1", t0), Submission::Recorded(Outcome::Valid));
//!
//! // Same label still in front of the camera half a second later
//! let t1 = t0 + TimeDelta::milliseconds(500);
//! assert_eq!(validator.submit("A1", t1), Submission::Cooldown);
//!
//! let t2 = t0 + TimeDelta::seconds(3);
//! assert_eq!(validator.submit("A1", t2), Submission::Recorded(Outcome::Duplicate));
//! assert_eq!(validator.history().len(), 2);
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::policy::MatchPolicy;
use super::record::{Counters, Outcome, Progress, ScanRecord};
use super::roster::Roster;

/// Default time before the same code can be recorded again.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Which scans a cooldown entry suppresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownScope {
    /// Only repeats of the same code are suppressed
    #[default]
    Key,
    /// Any code is suppressed within the window after the last recorded scan
    Global,
}

/// Settings for a [`ScanValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Suppression window for repeated reads. Zero disables it.
    pub cooldown: Duration,
    /// Whether the window applies per code or across all codes.
    pub cooldown_scope: CooldownScope,
    /// How codes are normalized before lookup.
    pub policy: MatchPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            cooldown_scope: CooldownScope::Key,
            policy: MatchPolicy::exact(),
        }
    }
}

impl ValidatorConfig {
    /// Set the cooldown window.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the cooldown scope.
    #[must_use]
    pub fn with_cooldown_scope(mut self, scope: CooldownScope) -> Self {
        self.cooldown_scope = scope;
        self
    }

    /// Set the match policy.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Result of [`ScanValidator::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A record was appended with this outcome.
    Recorded(Outcome),
    /// Suppressed by the cooldown window; nothing changed.
    Cooldown,
    /// The code was empty after trimming; nothing changed.
    Blank,
}

impl Submission {
    /// The recorded outcome, if any.
    #[must_use]
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Submission::Recorded(outcome) => Some(outcome),
            Submission::Cooldown | Submission::Blank => None,
        }
    }
}

/// Last-accepted timestamps used to debounce repeated reads.
#[derive(Debug, Clone)]
struct Cooldown {
    window: TimeDelta,
    scope: CooldownScope,
    per_key: HashMap<String, DateTime<Utc>>,
    last_any: Option<DateTime<Utc>>,
}

impl Cooldown {
    fn new(window: Duration, scope: CooldownScope) -> Self {
        Self {
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            scope,
            per_key: HashMap::new(),
            last_any: None,
        }
    }

    fn is_cooling(&self, key: &str, timestamp: DateTime<Utc>) -> bool {
        if self.window.is_zero() {
            return false;
        }
        let last = match self.scope {
            CooldownScope::Key => self.per_key.get(key).copied(),
            CooldownScope::Global => self.last_any,
        };
        // A timestamp older than the stored one also lands inside the window
        last.is_some_and(|last| timestamp.signed_duration_since(last) < self.window)
    }

    fn touch(&mut self, key: &str, timestamp: DateTime<Utc>) {
        match self.scope {
            CooldownScope::Key => {
                self.per_key.insert(key.to_string(), timestamp);
            }
            CooldownScope::Global => self.last_any = Some(timestamp),
        }
    }

    fn clear(&mut self) {
        self.per_key.clear();
        self.last_any = None;
    }
}

/// State of one scan session.
#[derive(Debug, Clone)]
pub struct ScanValidator {
    config: ValidatorConfig,
    roster: Roster,
    seen: HashSet<String>,
    counters: Counters,
    history: Vec<ScanRecord>,
    cooldown: Cooldown,
}

impl ScanValidator {
    /// Start a session with an empty roster.
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_roster(config, Roster::empty(config.policy))
    }

    /// Start a session with the given roster.
    #[must_use]
    pub fn with_roster(config: ValidatorConfig, roster: Roster) -> Self {
        Self {
            config,
            roster: roster.with_policy(config.policy),
            seen: HashSet::new(),
            counters: Counters::default(),
            history: Vec::new(),
            cooldown: Cooldown::new(config.cooldown, config.cooldown_scope),
        }
    }

    /// Rebuild a session from a saved history.
    ///
    /// Codes with a `valid` record are marked as seen and counters are
    /// recomputed from the records. Cooldown starts empty.
    #[must_use]
    pub fn restore(config: ValidatorConfig, roster: Roster, records: Vec<ScanRecord>) -> Self {
        let mut validator = Self::with_roster(config, roster);
        validator.seen = records
            .iter()
            .filter(|record| record.outcome == Outcome::Valid)
            .filter_map(|record| config.policy.normalize(&record.barcode))
            .collect();
        validator.counters = Counters::from_history(&records);
        validator.history = records;
        log::debug!(
            "Restored session with {} records ({} codes seen)",
            validator.history.len(),
            validator.seen.len()
        );
        validator
    }

    /// Classify one decoded code and record the result.
    ///
    /// See [`Submission`] for the possible results. Blank codes and repeats
    /// inside the cooldown window leave the session untouched.
    pub fn submit(&mut self, code: &str, timestamp: DateTime<Utc>) -> Submission {
        let Some(key) = self.config.policy.normalize(code) else {
            return Submission::Blank;
        };

        if self.cooldown.is_cooling(&key, timestamp) {
            log::trace!("Suppressed repeat read of {key} inside cooldown window");
            return Submission::Cooldown;
        }

        let outcome = if !self.roster.contains_key(&key) {
            Outcome::Invalid
        } else if self.seen.contains(&key) {
            Outcome::Duplicate
        } else {
            self.seen.insert(key.clone());
            Outcome::Valid
        };

        self.history
            .push(ScanRecord::new(code.trim(), timestamp, outcome));
        self.counters.record(outcome);
        self.cooldown.touch(&key, timestamp);

        log::debug!("Scan {} -> {}", code.trim(), outcome);

        Submission::Recorded(outcome)
    }

    /// Replace the roster wholesale.
    ///
    /// History and the seen set are left as they are, so earlier records
    /// keep their outcome even if the new roster no longer lists the code.
    pub fn replace_roster(&mut self, roster: Roster) {
        let roster = roster.with_policy(self.config.policy);
        log::info!(
            "Roster replaced: {} -> {} codes",
            self.roster.len(),
            roster.len()
        );
        self.roster = roster;
    }

    /// Clear history, seen set, counters, and cooldown together.
    ///
    /// The roster is kept.
    pub fn reset(&mut self) {
        log::info!("Clearing {} scan records", self.history.len());
        self.seen.clear();
        self.counters = Counters::default();
        self.history.clear();
        self.cooldown.clear();
    }

    /// Settings this session was created with.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Current roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// All records in chronological order of submission.
    #[must_use]
    pub fn history(&self) -> &[ScanRecord] {
        &self.history
    }

    /// The most recent record.
    #[must_use]
    pub fn last_record(&self) -> Option<&ScanRecord> {
        self.history.last()
    }

    /// Outcome totals.
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Whether `code` has already been accepted as valid.
    #[must_use]
    pub fn is_seen(&self, code: &str) -> bool {
        self.config
            .policy
            .normalize(code)
            .is_some_and(|key| self.seen.contains(&key))
    }

    /// Roster completion snapshot.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let scanned = if self.seen.len() <= self.roster.len() {
            self.seen
                .iter()
                .filter(|key| self.roster.contains_key(key))
                .count()
        } else {
            self.roster
                .keys()
                .filter(|key| self.seen.contains(*key))
                .count()
        };
        Progress {
            counters: self.counters,
            roster_size: self.roster.len(),
            scanned,
            remaining: self.roster.len() - scanned,
        }
    }
}
