//! HXL hashtag normalisation and attribute patterns.
//!
//! A hashtag is `#name` followed by zero or more `+attribute` parts. Source
//! files are inconsistent about spacing and case (`#sector +code +acronym`),
//! so every tag is normalised before it is compared.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IngestError, Result};

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[a-z][a-z0-9_]*(\+[a-z0-9_]+)*$").expect("Invalid HXL tag regex")
});

/// Lower-case `raw` and drop all whitespace, keeping attribute order.
pub fn normalize_tag(raw: &str) -> Result<String> {
    let tag: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if TAG_REGEX.is_match(&tag) {
        Ok(tag)
    } else {
        Err(IngestError::InvalidHxlTag {
            tag: raw.trim().to_string(),
        })
    }
}

/// Normalised tag with its attributes sorted and de-duplicated.
///
/// Two columns carry the same canonical tag exactly when HXL treats them as
/// the same column, whatever order their attributes were written in.
pub fn canonical_tag(raw: &str) -> Result<String> {
    let tag = normalize_tag(raw)?;
    let mut parts = tag.split('+');
    let hashtag = parts.next().unwrap_or_default();
    let mut attributes: Vec<&str> = parts.collect();
    attributes.sort_unstable();
    attributes.dedup();

    let mut canonical = hashtag.to_string();
    for attribute in attributes {
        canonical.push('+');
        canonical.push_str(attribute);
    }
    Ok(canonical)
}

/// A hashtag plus required attributes; `#*` matches any hashtag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    hashtag: Option<String>,
    include: Vec<String>,
}

impl TagPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let compact: String = pattern
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let mut parts = compact.split('+');
        let hashtag = match parts.next() {
            Some("#*") => None,
            Some(head) if head.len() > 1 && head.starts_with('#') => Some(head.to_string()),
            _ => {
                return Err(IngestError::InvalidHxlTag {
                    tag: pattern.trim().to_string(),
                });
            }
        };
        let include: Vec<String> = parts.map(str::to_string).collect();
        if include.iter().any(String::is_empty) {
            return Err(IngestError::InvalidHxlTag {
                tag: pattern.trim().to_string(),
            });
        }
        Ok(Self { hashtag, include })
    }

    /// True when `tag` has the pattern's hashtag and all its attributes.
    ///
    /// Tags that fail to normalise never match.
    pub fn matches(&self, tag: &str) -> bool {
        let Ok(tag) = normalize_tag(tag) else {
            return false;
        };
        let mut parts = tag.split('+');
        let hashtag = parts.next().unwrap_or_default();
        if let Some(expected) = &self.hashtag
            && expected != hashtag
        {
            return false;
        }
        let attributes: Vec<&str> = parts.collect();
        self.include
            .iter()
            .all(|wanted| attributes.contains(&wanted.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(
            normalize_tag("#Sector +code +Acronym").unwrap(),
            "#sector+code+acronym"
        );
        assert_eq!(
            canonical_tag("#org +type +preferred").unwrap(),
            canonical_tag("#org+preferred+type").unwrap()
        );
        assert_eq!(
            canonical_tag("#adm+parent+code+code").unwrap(),
            "#adm+code+parent"
        );
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(matches!(
            normalize_tag("population+total"),
            Err(IngestError::InvalidHxlTag { .. })
        ));
        assert!(normalize_tag("#population++total").is_err());
        assert!(normalize_tag("#").is_err());
    }

    #[test]
    fn patterns_match_on_attribute_subsets() {
        let female = TagPattern::parse("#*+f").unwrap();
        assert!(female.matches("#population+f+age_65_plus"));
        assert!(female.matches("#inneed +F"));
        assert!(!female.matches("#population+total"));

        let org = TagPattern::parse("#org+name").unwrap();
        assert!(org.matches("#org+name+acronym"));
        assert!(!org.matches("#sector+name"));
        assert!(TagPattern::parse("sector").is_err());
    }
}
