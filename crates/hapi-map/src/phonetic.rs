//! Phonetic nearest-neighbour matching.
//!
//! Names are encoded with Refined Soundex and compared by Levenshtein
//! distance between the encodings, so spelling variants across languages
//! (`logistique` / `logistics`) land close together.

use rapidfuzz::distance::levenshtein;

use crate::normalize::clean_name;

/// Maximum encoding distance accepted as a match.
pub const DEFAULT_THRESHOLD: usize = 2;

fn letter_code(ch: char) -> char {
    match ch {
        'B' | 'P' => '1',
        'F' | 'V' => '2',
        'C' | 'K' | 'S' => '3',
        'G' | 'J' => '4',
        'Q' | 'X' | 'Z' => '5',
        'D' | 'T' => '6',
        'L' => '7',
        'M' | 'N' => '8',
        'R' => '9',
        _ => '0',
    }
}

/// Refined Soundex encoding of a name.
///
/// Non-letters are ignored. The first letter is kept, followed by the code
/// of every letter with adjacent repeats collapsed. Returns an empty string
/// when the name has no ASCII letters.
pub fn refined_soundex(name: &str) -> String {
    let letters: Vec<char> = clean_name(name)
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    let Some(first) = letters.first() else {
        return String::new();
    };
    let mut encoded = String::with_capacity(letters.len() + 1);
    encoded.push(*first);
    let mut last = None;
    for ch in letters {
        let code = letter_code(ch);
        if last != Some(code) {
            encoded.push(code);
            last = Some(code);
        }
    }
    encoded
}

/// Distance between the phonetic encodings of two names.
pub fn phonetic_distance(left: &str, right: &str) -> usize {
    let left = refined_soundex(left);
    let right = refined_soundex(right);
    levenshtein::distance(left.chars(), right.chars())
}

#[derive(Debug, Clone, Copy)]
pub struct PhoneticMatcher {
    threshold: usize,
}

impl Default for PhoneticMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl PhoneticMatcher {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Index of the candidate closest to `name` (or `alternative`).
    ///
    /// Candidates further than the threshold are ignored; ties go to the
    /// earliest candidate.
    pub fn best_match<S: AsRef<str>>(
        &self,
        candidates: &[S],
        name: &str,
        alternative: Option<&str>,
    ) -> Option<usize> {
        let mut probes = vec![refined_soundex(name)];
        if let Some(alternative) = alternative {
            probes.push(refined_soundex(alternative));
        }
        probes.retain(|probe| !probe.is_empty());
        if probes.is_empty() {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let encoded = refined_soundex(candidate.as_ref());
            if encoded.is_empty() {
                continue;
            }
            for probe in &probes {
                let distance = levenshtein::distance(probe.chars(), encoded.chars());
                if distance > self.threshold {
                    continue;
                }
                if best.is_none_or(|(_, min)| distance < min) {
                    best = Some((idx, distance));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_refined_soundex() {
        assert_eq!(refined_soundex("Braz"), "B1905");
        assert_eq!(refined_soundex("health"), "H0760");
        assert_eq!(refined_soundex("HEA"), "H0");
        assert_eq!(refined_soundex("logistics"), "L70403603");
        assert_eq!(refined_soundex("logistique"), "L704036050");
        assert_eq!(refined_soundex("123"), "");
    }

    #[test]
    fn spelling_variants_are_close() {
        assert_eq!(phonetic_distance("logistique", "logistics"), 2);
        assert_eq!(phonetic_distance("NATIONAL_NGO", "national ngo"), 0);
        assert_eq!(phonetic_distance("international", "international ngo"), 3);
    }

    #[test]
    fn best_match_prefers_closest_then_first() {
        let matcher = PhoneticMatcher::default();
        let candidates = ["hea", "health", "education"];
        assert_eq!(matcher.best_match(&candidates, "health", None), Some(1));
        assert_eq!(matcher.best_match(&candidates, "nutrition", None), None);

        let duplicated = ["health", "health"];
        assert_eq!(matcher.best_match(&duplicated, "helth", None), Some(0));
    }

    #[test]
    fn alternative_name_is_also_tried() {
        let matcher = PhoneticMatcher::new(0);
        let candidates = ["national ngo"];
        assert_eq!(matcher.best_match(&candidates, "zzzz", Some("national ngo")), Some(0));
        assert_eq!(matcher.best_match(&candidates, "", None), None);
    }
}
