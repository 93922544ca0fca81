//! Typed rows of the reference sources.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};
use crate::reader::{FromHxlRow, HxlRow};

/// Tags of the shared geographic reference (global p-codes).
pub mod geo_tags {
    pub const ADMIN_LEVEL: &str = "#geo+admin_level";
    pub const CODE: &str = "#adm+code";
    pub const NAME: &str = "#adm+name";
    pub const PARENT: &str = "#adm+code+parent";
    pub const DATE_START: &str = "#date+start";
    pub const COUNTRY: &str = "#country+code";
}

/// Tags of the country reference.
pub mod country_tags {
    pub const ISO3: &str = "#country+code+v_iso3";
    pub const NAME: &str = "#country+name+preferred";
    pub const DATE_START: &str = "#date+start";
}

/// Tags of the curated organisation alias table.
pub mod org_alias_tags {
    pub const PATTERN: &str = "#x_pattern";
    pub const NAME: &str = "#org+name";
    pub const ACRONYM: &str = "#org+acronym";
    pub const TYPE_CODE: &str = "#org+type+code";
    pub const COUNTRY: &str = "#country+code";
}

pub mod sector_tags {
    pub const CODE: &str = "#sector+code+acronym";
    pub const NAME: &str = "#sector+name+preferred+i_en";
}

pub mod org_type_tags {
    pub const CODE: &str = "#org+type+code+v_hrinfo";
    pub const NAME: &str = "#org+type+preferred";
}

/// Parse a date cell; timestamps keep only their date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn required(row: &HxlRow, tag: &str, path: &Path) -> Result<String> {
    row.get_owned(tag).ok_or_else(|| IngestError::MissingValue {
        tag: tag.to_string(),
        line: row.line,
        path: path.to_path_buf(),
    })
}

fn date(row: &HxlRow, tag: &str, path: &Path) -> Result<Option<NaiveDate>> {
    match row.get(tag) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| IngestError::InvalidValue {
                tag: tag.to_string(),
                value: value.to_string(),
                line: row.line,
                path: path.to_path_buf(),
            }),
    }
}

/// One admin unit from the geographic reference.
///
/// The admin level is kept as written; rows for levels that are not built
/// are filtered out by the caller, not rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRow {
    pub admin_level: String,
    pub adm_code: String,
    pub adm_name: String,
    pub adm_code_parent: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub country_code: String,
    pub line: u64,
}

impl FromHxlRow for GeoRow {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self> {
        Ok(Self {
            admin_level: required(row, geo_tags::ADMIN_LEVEL, path)?,
            adm_code: required(row, geo_tags::CODE, path)?,
            adm_name: row.get_owned(geo_tags::NAME).unwrap_or_default(),
            adm_code_parent: row.get_owned(geo_tags::PARENT),
            date_start: date(row, geo_tags::DATE_START, path)?,
            country_code: required(row, geo_tags::COUNTRY, path)?,
            line: row.line,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRow {
    pub country_code_iso3: String,
    pub country_name_preferred: String,
    pub date_start: NaiveDate,
}

impl FromHxlRow for CountryRow {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self> {
        let date_start = date(row, country_tags::DATE_START, path)?.ok_or_else(|| {
            IngestError::MissingValue {
                tag: country_tags::DATE_START.to_string(),
                line: row.line,
                path: path.to_path_buf(),
            }
        })?;
        Ok(Self {
            country_code_iso3: required(row, country_tags::ISO3, path)?,
            country_name_preferred: required(row, country_tags::NAME, path)?,
            date_start,
        })
    }
}

/// An alternate spelling of an organisation and what it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgAliasRow {
    pub pattern: String,
    pub org_name: String,
    pub org_acronym: Option<String>,
    pub org_type_code: Option<String>,
    /// `None` for aliases valid in every country.
    pub country_code: Option<String>,
}

impl FromHxlRow for OrgAliasRow {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self> {
        Ok(Self {
            pattern: required(row, org_alias_tags::PATTERN, path)?,
            org_name: required(row, org_alias_tags::NAME, path)?,
            org_acronym: row.get_owned(org_alias_tags::ACRONYM),
            org_type_code: row.get_owned(org_alias_tags::TYPE_CODE),
            country_code: row.get_owned(org_alias_tags::COUNTRY),
        })
    }
}

/// `(code, display_name)` pair of a small code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRow {
    pub code: String,
    pub display_name: String,
}

/// Sector reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRow(pub CodeRow);

impl FromHxlRow for SectorRow {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self> {
        Ok(Self(CodeRow {
            code: required(row, sector_tags::CODE, path)?,
            display_name: required(row, sector_tags::NAME, path)?,
        }))
    }
}

/// Organisation type reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgTypeRow(pub CodeRow);

impl FromHxlRow for OrgTypeRow {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self> {
        Ok(Self(CodeRow {
            code: required(row, org_type_tags::CODE, path)?,
            display_name: required(row, org_type_tags::NAME, path)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::HxlReader;

    fn parse<T: FromHxlRow>(data: &str) -> Result<Vec<T>> {
        HxlReader::from_reader(data.as_bytes(), Path::new("inline.csv"))?
            .typed()
            .collect()
    }

    #[test]
    fn parses_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 1);
        assert_eq!(parse_date("2022-03-01"), expected);
        assert_eq!(parse_date(" 2022-03-01T00:00:00Z"), expected);
        assert_eq!(parse_date("01/03/2022"), None);
    }

    #[test]
    fn geo_rows_allow_missing_parent_and_date() {
        let rows: Vec<GeoRow> = parse(
            "#geo+admin_level,#adm+code,#adm+name,#adm+code+parent,#date+start,#country+code\n\
             1,AF01,Kabul,AFG,2021-11-17,AFG\n\
             2,AF0101,Kabul,AF01,,AFG\n",
        )
        .unwrap();
        assert_eq!(rows[0].adm_code_parent.as_deref(), Some("AFG"));
        assert_eq!(rows[1].date_start, None);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn bad_date_reports_line_and_value() {
        let err = parse::<CountryRow>(
            "#country+code+v_iso3,#country+name+preferred,#date+start\nAFG,Afghanistan,yesterday\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: invalid #date+start value 'yesterday' in inline.csv"
        );
    }

    #[test]
    fn code_rows_accept_spaced_tags() {
        let rows: Vec<SectorRow> = parse(
            "#sector +code +acronym,#sector +name +preferred +i_en\nHEA,Health\n",
        )
        .unwrap();
        assert_eq!(rows[0].0.code, "HEA");
        assert_eq!(rows[0].0.display_name, "Health");
    }

    #[test]
    fn org_alias_rows_keep_optional_fields() {
        let rows: Vec<OrgAliasRow> = parse(
            "#x_pattern,#org+name,#org+acronym,#org+type+code,#country+code\n\
             Action contre la Faim,Action Against Hunger,AAH,437,\n",
        )
        .unwrap();
        assert_eq!(rows[0].org_acronym.as_deref(), Some("AAH"));
        assert_eq!(rows[0].country_code, None);
    }
}
