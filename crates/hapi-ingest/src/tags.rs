//! Gender and age range codes carried in HXL attributes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IngestError, Result};
use crate::hxl::TagPattern;

/// Code used when a column covers every gender or every age.
pub const ALL: &str = "*";

/// Gender attributes, in match order (a later match wins).
pub const GENDER_CODES: [&str; 6] = ["f", "m", "x", "u", "o", "e"];

static POPULATION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#population(\+[a-z])*(\+age_(\d+_\d+|\d+_plus))*(\+total)?$")
        .expect("Invalid population tag regex")
});

static GENDER_PATTERNS: LazyLock<Vec<(TagPattern, &'static str)>> = LazyLock::new(|| {
    GENDER_CODES
        .iter()
        .filter_map(|code| {
            TagPattern::parse(&format!("#*+{code}"))
                .ok()
                .map(|pattern| (pattern, *code))
        })
        .collect()
});

/// Fail unless `tag` is a population column this pipeline understands.
///
/// Accepted shapes are `#population+total`, `#population+f+total`,
/// `#population+age_5_12+total`, `#population+age_80_plus+total`,
/// `#population+f+age_5_12` and so on.
pub fn validate_population_tag(tag: &str) -> Result<()> {
    if POPULATION_TAG.is_match(tag) {
        Ok(())
    } else {
        Err(IngestError::InvalidHxlTag {
            tag: tag.to_string(),
        })
    }
}

/// Gender and age range encoded in a tag's attributes.
///
/// ```
/// use hapi_ingest::gender_and_age_range;
///
/// assert_eq!(
///     gender_and_age_range("#population+f+age_65_plus"),
///     ("f".to_string(), "65+".to_string())
/// );
/// ```
pub fn gender_and_age_range(tag: &str) -> (String, String) {
    let gender = GENDER_PATTERNS
        .iter()
        .filter(|(pattern, _)| pattern.matches(tag))
        .map(|(_, code)| *code)
        .last()
        .unwrap_or(ALL);

    let age_range = tag
        .split('+')
        .find(|part| part.starts_with("age") || part.ends_with("age"))
        .map_or_else(
            || ALL.to_string(),
            |part| {
                let age = replace_each(part, &[("age_", ""), ("_age", ""), ("age", "")]);
                if age.ends_with("plus") {
                    replace_each(&age, &[("_plus", "+"), ("plus", "+")])
                } else {
                    age.replace('_', "-")
                }
            },
        );

    (gender.to_string(), age_range)
}

/// Bounds of an age range code; open ranges have no maximum.
pub fn min_and_max_age(age_range: &str) -> Result<(Option<i64>, Option<i64>)> {
    if age_range == ALL || age_range == "unknown" {
        return Ok((None, None));
    }
    let invalid = || IngestError::InvalidAgeRange {
        range: age_range.to_string(),
    };
    let parse = |value: &str| value.trim().parse::<i64>().map_err(|_| invalid());

    match age_range.split_once('-') {
        Some((min, max)) => Ok((Some(parse(min)?), Some(parse(max)?))),
        None => Ok((Some(parse(&age_range.replace('+', ""))?), None)),
    }
}

/// Replace occurrences left to right, trying `replacements` in order at
/// each position (longest keys first).
fn replace_each(value: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    'scan: while !rest.is_empty() {
        for (from, to) in replacements {
            if let Some(tail) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(gender: &str, age: &str) -> (String, String) {
        (gender.to_string(), age.to_string())
    }

    #[test]
    fn reads_gender_and_age_from_attributes() {
        assert_eq!(gender_and_age_range("#population+m+total"), pair("m", "*"));
        assert_eq!(
            gender_and_age_range("#population+age_20_24+total"),
            pair("*", "20-24")
        );
        assert_eq!(
            gender_and_age_range("#population+f+age_65_plus"),
            pair("f", "65+")
        );
        assert_eq!(gender_and_age_range("#inneed+age0_17"), pair("*", "0-17"));
        assert_eq!(
            gender_and_age_range("#targeted+edu+m+age18plus"),
            pair("m", "18+")
        );
        assert_eq!(
            gender_and_age_range("#affected+m+unknown_age"),
            pair("m", "unknown")
        );
        assert_eq!(
            gender_and_age_range("#affected+f+adolescents+age_12_17"),
            pair("f", "12-17")
        );
    }

    #[test]
    fn age_bounds() {
        assert_eq!(min_and_max_age("*").unwrap(), (None, None));
        assert_eq!(min_and_max_age("unknown").unwrap(), (None, None));
        assert_eq!(min_and_max_age("20-24").unwrap(), (Some(20), Some(24)));
        assert_eq!(min_and_max_age("65+").unwrap(), (Some(65), None));
        assert!(matches!(
            min_and_max_age("adults"),
            Err(IngestError::InvalidAgeRange { .. })
        ));
    }

    #[test]
    fn population_tag_shapes() {
        for tag in [
            "#population+total",
            "#population+f+total",
            "#population+age_5_12+total",
            "#population+age_80_plus+total",
            "#population+f+age_5_12",
        ] {
            assert!(validate_population_tag(tag).is_ok(), "{tag}");
        }
        for tag in ["#population+female", "#inneed+total", "#population+age5_12"] {
            assert!(validate_population_tag(tag).is_err(), "{tag}");
        }
    }
}
