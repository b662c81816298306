//! Thread-safe handle around a [`ScanValidator`].
//!
//! Hosts that decode frames on a worker thread share one session through a
//! [`SharedValidator`]. Every operation takes the same lock for its whole
//! duration, so a submit observes either the old roster or the new one in
//! full, never a mix.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::record::{Counters, Progress, ScanRecord};
use super::roster::Roster;
use super::state::{ScanValidator, Submission};

/// Cloneable, lock-protected scan session.
#[derive(Debug, Clone)]
pub struct SharedValidator {
    inner: Arc<Mutex<ScanValidator>>,
}

impl SharedValidator {
    /// Wrap an existing session.
    #[must_use]
    pub fn new(validator: ScanValidator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(validator)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScanValidator> {
        // submit never panics mid-update, so a poisoned lock still holds consistent state
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// See [`ScanValidator::submit`].
    pub fn submit(&self, code: &str, timestamp: DateTime<Utc>) -> Submission {
        self.lock().submit(code, timestamp)
    }

    /// Submit and return the appended record along with a progress snapshot,
    /// both taken under the same lock.
    pub fn submit_and_snapshot(
        &self,
        code: &str,
        timestamp: DateTime<Utc>,
    ) -> (Submission, Option<ScanRecord>, Progress) {
        let mut guard = self.lock();
        let submission = guard.submit(code, timestamp);
        let record = match submission {
            Submission::Recorded(_) => guard.last_record().cloned(),
            Submission::Cooldown | Submission::Blank => None,
        };
        (submission, record, guard.progress())
    }

    /// Swap in a roster that was parsed outside the lock.
    pub fn replace_roster(&self, roster: Roster) {
        self.lock().replace_roster(roster);
    }

    /// See [`ScanValidator::reset`].
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Copy of the history.
    #[must_use]
    pub fn history(&self) -> Vec<ScanRecord> {
        self.lock().history().to_vec()
    }

    /// Outcome totals.
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.lock().counters()
    }

    /// Roster completion snapshot.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.lock().progress()
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut ScanValidator) -> R) -> R {
        f(&mut self.lock())
    }
}
