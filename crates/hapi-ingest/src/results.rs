//! Theme result sets and dataset metadata, as produced by the scrapers.
//!
//! A result set holds, for each source dataset, its descriptor, the period
//! covered and one block of columns per granularity the dataset was queried
//! at. Columns are keyed by HXL tag; each maps admin codes to the values
//! reported for that code (one value, or one per row when a code repeats as
//! in 3W data).
//!
//! ```json
//! {
//!   "datasets": [{
//!     "dataset": { "hdx_id": "...", "resources": [ ... ], ... },
//!     "time_period": { "start": "2023-01-01", "end": "2023-12-31" },
//!     "results": {
//!       "national": {
//!         "resource_id": "...",
//!         "columns": { "#population+total": { "AFG": "41128771" } }
//!       }
//!     }
//!   }]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use hapi_model::{DatasetDescriptor, Granularity};

use crate::error::{IngestError, Result};
use crate::fingerprint::fingerprint_dataset;

/// A scalar value from a result column, kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cell(pub String);

impl Cell {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
            Bool(bool),
            Null,
        }

        Ok(Self(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.trim().to_string(),
            Raw::Int(value) => value.to_string(),
            Raw::Float(value) => value.to_string(),
            Raw::Bool(value) => value.to_string(),
            Raw::Null => String::new(),
        }))
    }
}

/// Values reported for one admin code in one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cells(pub Vec<Cell>);

impl Cells {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(Cell::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Cell::as_str)
    }
}

impl<'de> Deserialize<'de> for Cells {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Many(Vec<Cell>),
            One(Cell),
        }

        Ok(Self(match Raw::deserialize(deserializer)? {
            Raw::Many(cells) => cells,
            Raw::One(cell) => vec![cell],
        }))
    }
}

/// Admin code to reported values.
pub type Column = BTreeMap<String, Cells>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// Columns returned for one granularity of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityResult {
    /// External id of the resource the values were read from.
    pub resource_id: String,
    pub columns: BTreeMap<String, Column>,
}

impl GranularityResult {
    pub fn column(&self, tag: &str) -> Option<&Column> {
        self.columns.get(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetResult {
    pub dataset: DatasetDescriptor,
    pub time_period: TimePeriod,
    pub results: BTreeMap<Granularity, GranularityResult>,
}

/// Every dataset returned for one theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeResults {
    pub datasets: Vec<DatasetResult>,
}

impl ThemeResults {
    pub fn descriptors(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.iter().map(|result| &result.dataset)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| IngestError::file(path.to_path_buf(), e))?;
    serde_json::from_str(&text).map_err(|source| IngestError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Load a theme result set, fingerprinting resources found on disk.
pub fn load_theme_results(path: &Path) -> Result<ThemeResults> {
    let mut results: ThemeResults = read_json(path)?;
    for result in &mut results.datasets {
        fingerprint_dataset(base_dir(path), &mut result.dataset)?;
    }
    info!(path = %path.display(), datasets = results.datasets.len(), "loaded theme results");
    Ok(results)
}

/// Load a standalone list of dataset descriptors.
pub fn load_metadata(path: &Path) -> Result<Vec<DatasetDescriptor>> {
    let mut datasets: Vec<DatasetDescriptor> = read_json(path)?;
    for dataset in &mut datasets {
        fingerprint_dataset(base_dir(path), dataset)?;
    }
    info!(path = %path.display(), datasets = datasets.len(), "loaded dataset metadata");
    Ok(datasets)
}
