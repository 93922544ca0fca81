#![deny(unsafe_code)]

//! Reading the inputs of a pipeline run.
//!
//! # Features
//!
//! - **HXL CSV**: locate the hashtag row and stream tagged rows
//!   ([`HxlReader`]), with tags compared in canonical form
//! - **Reference rows**: geographic p-codes, countries, organisation aliases,
//!   sectors and organisation types as typed rows
//! - **Result sets**: per-theme JSON result sets and dataset metadata, with
//!   SHA-256 fingerprints for resources available locally
//! - **Tag parsing**: gender and age range codes carried in HXL attributes

mod error;
mod fingerprint;
mod hxl;
mod reader;
mod results;
mod rows;
mod tags;

// === Error Types ===
pub use error::{IngestError, Result};

// === HXL ===
pub use hxl::{TagPattern, canonical_tag, normalize_tag};
pub use reader::{FromHxlRow, HxlReader, HxlRow, MAX_HEADER_ROWS, read_hxl};

// === Reference Rows ===
pub use rows::{
    CodeRow, CountryRow, GeoRow, OrgAliasRow, OrgTypeRow, SectorRow, country_tags, geo_tags,
    org_alias_tags, org_type_tags, parse_date, sector_tags,
};

// === Result Sets ===
pub use fingerprint::{fingerprint_dataset, local_path, sha256_file};
pub use results::{
    Cell, Cells, Column, DatasetResult, GranularityResult, ThemeResults, TimePeriod,
    load_metadata, load_theme_results,
};

// === Tag Parsing ===
pub use tags::{ALL, GENDER_CODES, gender_and_age_range, min_and_max_age, validate_population_tag};
