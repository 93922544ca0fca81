//! Deduplicated run messages.
//!
//! Problems met while populating a theme are collected rather than logged
//! immediately, so the same missing code reported by a thousand rows shows
//! up once. Everything is flushed to the log at the end of the run.

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Serialize;
use tracing::{error, warn};

/// How many values a multi-valued message lists before truncating.
pub const MAX_LISTED_VALUES: usize = 10;

/// Set of formatted messages, each kept once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Messages {
    entries: BTreeSet<String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `"{identifier} - {text}"`.
    pub fn add_message(&mut self, identifier: &str, text: impl Display) {
        self.entries.insert(format!("{identifier} - {text}"));
    }

    /// Record that `value` of kind `value_type` could not be resolved.
    pub fn add_missing_value_message(
        &mut self,
        identifier: &str,
        value_type: &str,
        value: impl Display,
    ) {
        self.add_message(identifier, format_args!("{value_type} {value} not found"));
    }

    /// Record a message listing up to [`MAX_LISTED_VALUES`] values.
    ///
    /// Returns `false` (and records nothing) when `values` is empty.
    pub fn add_multi_valued_message<V: Display>(
        &mut self,
        identifier: &str,
        text: &str,
        values: &[V],
    ) -> bool {
        if values.is_empty() {
            return false;
        }
        let listed: Vec<String> = values
            .iter()
            .take(MAX_LISTED_VALUES)
            .map(ToString::to_string)
            .collect();
        let truncated = if values.len() > MAX_LISTED_VALUES {
            ". First 10 values"
        } else {
            ""
        };
        self.add_message(
            identifier,
            format_args!("{} {text}{truncated}: {}", values.len(), listed.join(", ")),
        );
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// Warnings and errors gathered over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMessages {
    pub warnings: Messages,
    pub errors: Messages,
}

impl RunMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Emit every collected message, warnings first.
    pub fn log_all(&self) {
        for message in self.warnings.iter() {
            warn!("{message}");
        }
        for message in self.errors.iter() {
            error!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn formats_plain_and_missing_value_messages() {
        let mut messages = Messages::new();
        messages.add_message("afg-3w", "Sector missing from dataset");
        messages.add_missing_value_message("afg-3w", "sector", "CCS");
        messages.add_missing_value_message("afg-3w", "sector", "CCS");

        assert_eq!(messages.len(), 2);
        assert_snapshot!(messages.to_vec().join("\n"), @r"
        afg-3w - Sector missing from dataset
        afg-3w - sector CCS not found
        ");
    }

    #[test]
    fn multi_valued_messages_list_at_most_ten_values() {
        let mut messages = Messages::new();
        let codes: Vec<String> = (1..=12).map(|i| format!("AF{i:02}")).collect();
        assert!(messages.add_multi_valued_message("afg-pop", "admin codes skipped", &codes));
        assert!(messages.add_multi_valued_message("cod-pop", "orgs unmatched", &["MSF", "IRC"]));
        assert!(!messages.add_multi_valued_message::<&str>("x", "nothing", &[]));

        assert_snapshot!(messages.to_vec().join("\n"), @r"
        afg-pop - 12 admin codes skipped. First 10 values: AF01, AF02, AF03, AF04, AF05, AF06, AF07, AF08, AF09, AF10
        cod-pop - 2 orgs unmatched: MSF, IRC
        ");
    }
}
