//! Barcode matching policy.
//!
//! Every code is trimmed before comparison. Whether letter case and leading
//! zeros are significant depends on the symbology in use, so both are opt-in
//! normalizations rather than fixed behaviour.
//!
//! # Example
//!
//! ```
//! use scancheck::validator::MatchPolicy;
//!
//! let exact = MatchPolicy::default();
//! assert_eq!(exact.normalize("  abc123 ").as_deref(), Some("abc123"));
//!
//! let loose = MatchPolicy {
//!     case_insensitive: true,
//!     strip_leading_zeros: true,
//! };
//! assert_eq!(loose.normalize("000abc").as_deref(), Some("ABC"));
//! assert_eq!(loose.normalize("   "), None);
//! ```

use serde::{Deserialize, Serialize};

/// How decoded strings are turned into roster keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Compare codes ignoring letter case.
    pub case_insensitive: bool,
    /// Treat `000123` and `123` as the same code.
    pub strip_leading_zeros: bool,
}

impl MatchPolicy {
    /// Exact matching after trimming. This is the default.
    #[must_use]
    pub const fn exact() -> Self {
        Self {
            case_insensitive: false,
            strip_leading_zeros: false,
        }
    }

    /// Normalize a decoded string into a roster key.
    ///
    /// Returns `None` when nothing remains after trimming.
    #[must_use]
    pub fn normalize(&self, code: &str) -> Option<String> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut key: &str = trimmed;
        if self.strip_leading_zeros {
            let stripped = key.trim_start_matches('0');
            // An all-zero code keeps a single zero
            key = if stripped.is_empty() { "0" } else { stripped };
        }

        if self.case_insensitive {
            Some(key.to_uppercase())
        } else {
            Some(key.to_string())
        }
    }
}
