//! Admin levels, reporting granularities and the unspecified connector codes.
//!
//! Fact tables are keyed on admin2. A source reporting at national or admin1
//! granularity is attached to a synthetic "unspecified" node:
//!
//! ```text
//! national  AFG     ->  AFG-XXX-XXX   (admin2 under the AFG-XXX admin1 connector)
//! adminone  AF01    ->  AF01-XXX      (admin2 connector under AF01)
//! admintwo  AF0101  ->  AF0101
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Suffix appended to a parent code to form its unspecified child.
pub const CONNECTOR_SUFFIX: &str = "-XXX";

/// Name given to every synthetic connector row.
pub const UNSPECIFIED_NAME: &str = "UNSPECIFIED";

/// Subnational admin level stored in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdminLevel {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl AdminLevel {
    /// Levels in build order; level 2 parents are level 1 keys.
    pub const ALL: [AdminLevel; 2] = [AdminLevel::One, AdminLevel::Two];

    /// The `#geo+admin_level` value for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
        }
    }

    /// Warehouse table holding rows of this level.
    pub fn table(self) -> &'static str {
        match self {
            Self::One => "admin1",
            Self::Two => "admin2",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            other => Err(ModelError::InvalidAdminLevel(other.to_string())),
        }
    }
}

/// Granularity at which a source dataset reports its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    National,
    AdminOne,
    AdminTwo,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::National => "national",
            Self::AdminOne => "adminone",
            Self::AdminTwo => "admintwo",
        }
    }

    /// Map a code reported at this granularity onto the admin2 code space.
    pub fn admin2_code(self, admin_code: &str) -> String {
        match self {
            Self::National => admin2_connector_code(&admin1_connector_code(admin_code)),
            Self::AdminOne => admin2_connector_code(admin_code),
            Self::AdminTwo => admin_code.to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "national" => Ok(Self::National),
            "adminone" => Ok(Self::AdminOne),
            "admintwo" => Ok(Self::AdminTwo),
            other => Err(ModelError::InvalidGranularity(other.to_string())),
        }
    }
}

/// Code of the unspecified admin1 under a location.
pub fn admin1_connector_code(location_code: &str) -> String {
    format!("{location_code}{CONNECTOR_SUFFIX}")
}

/// Code of the unspecified admin2 under an admin1 (real or connector).
///
/// To reach admin2 from a location code, pass the output of
/// [`admin1_connector_code`].
pub fn admin2_connector_code(admin1_code: &str) -> String {
    format!("{admin1_code}{CONNECTOR_SUFFIX}")
}

/// Resolve an admin code reported at `granularity` to its admin2 code.
///
/// Pure and deterministic. Any granularity literal other than `national`,
/// `adminone` or `admintwo` is rejected with
/// [`ModelError::InvalidGranularity`].
pub fn resolve_admin2(admin_code: &str, granularity: &str) -> Result<String, ModelError> {
    let granularity: Granularity = granularity.parse()?;
    Ok(granularity.admin2_code(admin_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_each_granularity() {
        assert_eq!(resolve_admin2("AFG", "national").unwrap(), "AFG-XXX-XXX");
        assert_eq!(resolve_admin2("AF01", "adminone").unwrap(), "AF01-XXX");
        assert_eq!(resolve_admin2("AF0101", "admintwo").unwrap(), "AF0101");
    }

    #[test]
    fn rejects_unknown_granularity() {
        let err = resolve_admin2("AFG", "admin3").unwrap_err();
        assert_eq!(err, ModelError::InvalidGranularity("admin3".to_string()));
        assert!(resolve_admin2("AFG", "National").is_err());
    }

    #[test]
    fn national_goes_through_admin1_connector() {
        let admin1 = admin1_connector_code("SSD");
        assert_eq!(admin1, "SSD-XXX");
        assert_eq!(admin2_connector_code(&admin1), resolve_admin2("SSD", "national").unwrap());
    }

    #[test]
    fn admin_level_parses_only_known_levels() {
        assert_eq!("1".parse::<AdminLevel>().unwrap(), AdminLevel::One);
        assert_eq!("2".parse::<AdminLevel>().unwrap(), AdminLevel::Two);
        assert!("3".parse::<AdminLevel>().is_err());
        assert_eq!(AdminLevel::Two.table(), "admin2");
    }

    #[test]
    fn granularity_serde_names() {
        let json = serde_json::to_string(&Granularity::AdminOne).unwrap();
        assert_eq!(json, "\"adminone\"");
        let parsed: Granularity = serde_json::from_str("\"admintwo\"").unwrap();
        assert_eq!(parsed, Granularity::AdminTwo);
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(code in "[A-Z]{2,3}[0-9]{0,6}", idx in 0usize..3) {
            let granularity = ["national", "adminone", "admintwo"][idx];
            let first = resolve_admin2(&code, granularity).unwrap();
            let second = resolve_admin2(&code, granularity).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.starts_with(&code));
        }
    }
}
