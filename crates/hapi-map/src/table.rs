//! A code table bound to a [`NameMatcher`], learning aliases as it goes.

use std::collections::{BTreeMap, BTreeSet};

use crate::matcher::{NameMatcher, Resolution};

/// Official names/codes plus a user alias mapping.
///
/// Phonetic hits are written back into the user mapping for the remainder of
/// the run; nothing is persisted across runs.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    lookup: BTreeMap<String, String>,
    user_mapping: BTreeMap<String, String>,
    codes: BTreeSet<String>,
    matcher: NameMatcher,
}

impl CodeTable {
    pub fn new(user_mapping: BTreeMap<String, String>) -> Self {
        Self {
            user_mapping,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: NameMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Register an official name for `code`.
    pub fn insert_name(&mut self, name: &str, code: &str) {
        self.lookup.insert(name.to_string(), code.to_string());
        self.codes.insert(code.to_string());
    }

    /// Register `code` under its official name and under itself.
    pub fn insert(&mut self, name: &str, code: &str) {
        self.insert_name(name, code);
        self.insert_name(code, code);
    }

    /// Resolve without learning.
    pub fn resolve(&self, name: &str) -> Resolution {
        self.matcher.resolve(name, &self.lookup, &self.user_mapping)
    }

    /// Resolve `name`, remembering phonetic matches.
    pub fn get_code(&mut self, name: &str) -> Option<String> {
        let resolution = self.resolve(name);
        if resolution.should_persist
            && let Some(code) = &resolution.code
        {
            self.user_mapping
                .insert(resolution.normalized.clone(), code.clone());
        }
        resolution.code
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn lookup(&self) -> &BTreeMap<String, String> {
        &self.lookup
    }

    pub fn user_mapping(&self) -> &BTreeMap<String, String> {
        &self.user_mapping
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
