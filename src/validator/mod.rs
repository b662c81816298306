//! Scan validation core.
//!
//! This module provides:
//! - [`MatchPolicy`]: how decoded strings become roster keys
//! - [`Roster`]: the expected barcode set
//! - [`ScanValidator`]: classification, deduplication, cooldown and history
//! - [`SharedValidator`]: the same session behind a single lock
//!
//! Nothing in here performs I/O or reads a clock.

pub mod policy;
pub mod record;
pub mod roster;
pub mod shared;
pub mod state;

pub use policy::MatchPolicy;
pub use record::{Counters, Outcome, Progress, ScanRecord};
pub use roster::Roster;
pub use shared::SharedValidator;
pub use state::{CooldownScope, ScanValidator, Submission, ValidatorConfig, DEFAULT_COOLDOWN};
