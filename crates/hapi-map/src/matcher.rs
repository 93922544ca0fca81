//! Tiered name-to-code resolution.
//!
//! Resolution short-circuits on the first hit:
//!
//! 1. **Exact**: `name` as-is against the official lookup (case-sensitive;
//!    the lookup is seeded with both official names and official codes).
//! 2. **Alias**: [`clean_name`] of `name` against the user mapping of known
//!    unofficial aliases (keys are expected in cleaned form).
//! 3. **Phonetic**: for cleaned names long enough to be meaningful, nearest
//!    phonetic neighbour among the lower-cased official names, then among the
//!    user mapping keys. A hit here should be written back to the user
//!    mapping so the next identical name resolves at tier 2.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::clean_name;
use crate::phonetic::PhoneticMatcher;

/// Cleaned names shorter than this skip the phonetic tier.
pub const DEFAULT_MIN_PHONETIC_LEN: usize = 4;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Exact,
    Alias,
    Phonetic,
}

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub code: Option<String>,
    /// The cleaned form of the input name.
    pub normalized: String,
    /// True when the caller should add `normalized -> code` to its user mapping.
    pub should_persist: bool,
    pub tier: Option<MatchTier>,
}

impl Resolution {
    fn hit(code: &str, normalized: String, tier: MatchTier) -> Self {
        Self {
            code: Some(code.to_string()),
            normalized,
            should_persist: tier == MatchTier::Phonetic,
            tier: Some(tier),
        }
    }

    fn miss(normalized: String) -> Self {
        Self {
            code: None,
            normalized,
            should_persist: false,
            tier: None,
        }
    }

    /// The `(code, normalized, should_persist)` triple.
    pub fn into_parts(self) -> (Option<String>, String, bool) {
        (self.code, self.normalized, self.should_persist)
    }
}

/// Generic resolver, unaware of what kind of code it resolves.
#[derive(Debug, Clone, Copy)]
pub struct NameMatcher {
    phonetic: PhoneticMatcher,
    min_phonetic_len: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NameMatcher {
    pub fn new() -> Self {
        Self {
            phonetic: PhoneticMatcher::default(),
            min_phonetic_len: DEFAULT_MIN_PHONETIC_LEN,
        }
    }

    /// Set the shortest cleaned name eligible for phonetic matching.
    #[must_use]
    pub fn with_min_phonetic_len(mut self, len: usize) -> Self {
        self.min_phonetic_len = len;
        self
    }

    /// Replace the phonetic matcher (e.g. to change its threshold).
    #[must_use]
    pub fn with_phonetic(mut self, phonetic: PhoneticMatcher) -> Self {
        self.phonetic = phonetic;
        self
    }

    /// Resolve `name` against the official lookup and the user mapping.
    pub fn resolve(
        &self,
        name: &str,
        code_lookup: &BTreeMap<String, String>,
        user_mapping: &BTreeMap<String, String>,
    ) -> Resolution {
        let normalized = clean_name(name);

        if let Some(code) = code_lookup.get(name) {
            return Resolution::hit(code, normalized, MatchTier::Exact);
        }
        if let Some(code) = user_mapping.get(&normalized) {
            return Resolution::hit(code, normalized, MatchTier::Alias);
        }
        if normalized.chars().count() < self.min_phonetic_len {
            return Resolution::miss(normalized);
        }

        for table in [code_lookup, user_mapping] {
            let names: Vec<&String> = table.keys().collect();
            let lowered: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
            let found = self
                .phonetic
                .best_match(&lowered, name, Some(normalized.as_str()));
            if let Some(idx) = found {
                let code = &table[names[idx]];
                return Resolution::hit(code, normalized, MatchTier::Phonetic);
            }
        }

        Resolution::miss(normalized)
    }
}

/// Convenience wrapper over [`NameMatcher::resolve`] with default settings.
pub fn resolve(
    name: &str,
    code_lookup: &BTreeMap<String, String>,
    user_mapping: &BTreeMap<String, String>,
) -> Resolution {
    NameMatcher::new().resolve(name, code_lookup, user_mapping)
}
