//! Fact rows emitted by the theme populators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::RowId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRow {
    pub resource_ref: RowId,
    pub admin2_ref: RowId,
    /// Gender code, `*` for all.
    pub gender: String,
    /// Age range code such as `20-24` or `65+`, `*` for all.
    pub age_range: String,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub population: i64,
    pub reference_period_start: NaiveDate,
    pub reference_period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalPresenceRow {
    pub resource_ref: RowId,
    pub admin2_ref: RowId,
    pub org_ref: RowId,
    pub sector_code: String,
    pub reference_period_start: NaiveDate,
    pub reference_period_end: Option<NaiveDate>,
}
