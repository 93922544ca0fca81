//! Error types for reference data and result-set loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading HXL sources.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV / JSON Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to parse a JSON result set.
    #[error("failed to parse JSON {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === HXL Errors ===
    /// No row of hashtags was found near the top of the file.
    #[error("no HXL hashtag row found in {path}")]
    NoHashtagRow { path: PathBuf },

    /// A hashtag does not have the `#tag+attr` shape.
    #[error("HXL tag {tag} not in valid format")]
    InvalidHxlTag { tag: String },

    /// An age range code is neither `min-max` nor `min+`.
    #[error("age range {range} not in valid format")]
    InvalidAgeRange { range: String },

    /// A required column is absent from the source.
    #[error("required tag '{tag}' not found in {path}")]
    MissingTag { tag: String, path: PathBuf },

    /// A required value is empty.
    #[error("line {line}: missing value for {tag} in {path}")]
    MissingValue {
        tag: String,
        line: u64,
        path: PathBuf,
    },

    /// A value could not be parsed.
    #[error("line {line}: invalid {tag} value '{value}' in {path}")]
    InvalidValue {
        tag: String,
        value: String,
        line: u64,
        path: PathBuf,
    },
}

impl IngestError {
    pub(crate) fn file(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
