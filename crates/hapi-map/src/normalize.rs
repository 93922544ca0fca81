//! Text normalization shared by every matching tier.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes a free-text name for comparison.
///
/// - Strips diacritics (`Santé` -> `sante`)
/// - Converts to lowercase
/// - Replaces punctuation and separators with single spaces
pub fn clean_name(raw: &str) -> String {
    let folded: String = raw
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();
    folded
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-cased [`clean_name`], used for organisation identity keys.
pub fn clean_upper(raw: &str) -> String {
    clean_name(raw).to_uppercase()
}

/// Identity key of an organisation.
///
/// Both parts are [`clean_upper`]ed, so they never contain the `|` joining
/// them.
pub fn org_identity(acronym: &str, name: &str) -> String {
    format!("{}|{}", clean_upper(acronym), clean_upper(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_separators() {
        assert_eq!(clean_name("COOPÉRATION_INTERNATIONALE"), "cooperation internationale");
        assert_eq!(clean_name("Santé"), "sante");
        assert_eq!(clean_name("  Camp Coordination / Management "), "camp coordination management");
        assert_eq!(clean_name("NATIONAL_NGO"), "national ngo");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(clean_name(""), "");
        assert_eq!(clean_name(" -- / "), "");
    }

    #[test]
    fn upper_form() {
        assert_eq!(clean_upper("Médecins Sans Frontières"), "MEDECINS SANS FRONTIERES");
        assert_eq!(clean_upper("a.a.h"), "A A H");
    }

    #[test]
    fn org_identity_ignores_case_and_punctuation() {
        assert_eq!(
            org_identity("A.A.H", "Action Against Hunger"),
            org_identity("a a h", "ACTION AGAINST HUNGER ")
        );
        assert_eq!(org_identity("MSF", "Médecins"), "MSF|MEDECINS");
    }
}
