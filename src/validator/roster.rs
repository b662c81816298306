//! The set of expected barcodes for a session.

use std::collections::HashSet;

use super::policy::MatchPolicy;

/// Expected barcode keys, normalized under a [`MatchPolicy`].
///
/// A roster never changes once built; reloading replaces it wholesale.
/// The trimmed source codes are kept alongside the keys so the roster can
/// be re-keyed under another policy without losing information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    keys: HashSet<String>,
    codes: HashSet<String>,
    policy: MatchPolicy,
}

impl Roster {
    /// An empty roster. Every scan against it is invalid.
    #[must_use]
    pub fn empty(policy: MatchPolicy) -> Self {
        Self {
            keys: HashSet::new(),
            codes: HashSet::new(),
            policy,
        }
    }

    /// Build a roster from raw codes.
    ///
    /// Blank codes are dropped and codes that normalize to the same key
    /// collapse into one member.
    pub fn from_codes<I, S>(codes: I, policy: MatchPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::empty(policy);
        for code in codes {
            let code = code.as_ref();
            if let Some(key) = policy.normalize(code) {
                roster.keys.insert(key);
                roster.codes.insert(code.trim().to_string());
            }
        }
        roster
    }

    /// Policy the keys were normalized with.
    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Re-key this roster under a different policy.
    #[must_use]
    pub fn with_policy(self, policy: MatchPolicy) -> Self {
        if policy == self.policy {
            return self;
        }
        Self::from_codes(self.codes, policy)
    }

    /// Whether an already-normalized key is on the roster.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Normalize `code` and check membership.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.policy
            .normalize(code)
            .is_some_and(|key| self.keys.contains(&key))
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the roster has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// The first `limit` keys in sorted order, for previews.
    #[must_use]
    pub fn preview(&self, limit: usize) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys.truncate(limit);
        keys
    }
}
