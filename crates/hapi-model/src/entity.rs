//! Reference entity rows written once at the start of a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::admin::{UNSPECIFIED_NAME, admin1_connector_code, admin2_connector_code};

/// Surrogate key assigned by the warehouse.
pub type RowId = i64;

/// A tracked country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// ISO3 code, unique.
    pub code: String,
    pub name: String,
    /// Date the country entity became valid.
    pub reference_period_start: NaiveDate,
}

/// First-level subnational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin1 {
    pub location_ref: RowId,
    /// P-code, unique within the level.
    pub code: String,
    pub name: String,
    pub is_unspecified: bool,
    pub reference_period_start: NaiveDate,
}

impl Admin1 {
    /// The connector row standing for "no admin1 detail" under a location.
    pub fn unspecified(location_ref: RowId, location_code: &str, start: NaiveDate) -> Self {
        Self {
            location_ref,
            code: admin1_connector_code(location_code),
            name: UNSPECIFIED_NAME.to_string(),
            is_unspecified: true,
            reference_period_start: start,
        }
    }
}

/// Second-level subnational unit; every fact row references one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin2 {
    pub admin1_ref: RowId,
    pub code: String,
    pub name: String,
    pub is_unspecified: bool,
    pub reference_period_start: NaiveDate,
}

impl Admin2 {
    /// The connector row standing for "no admin2 detail" under an admin1.
    pub fn unspecified(admin1_ref: RowId, admin1_code: &str, start: NaiveDate) -> Self {
        Self {
            admin1_ref,
            code: admin2_connector_code(admin1_code),
            name: UNSPECIFIED_NAME.to_string(),
            is_unspecified: true,
            reference_period_start: start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgType {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub code: String,
    pub name: String,
}

/// Canonical organisation.
///
/// Identity is the upper-cased cleaned `(acronym, name)` pair; the type code
/// is fixed at first observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    pub acronym: String,
    pub name: String,
    pub org_type_code: Option<String>,
    pub reference_period_start: NaiveDate,
}
