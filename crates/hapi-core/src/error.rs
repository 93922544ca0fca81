//! Error types for the reconciliation engine.

use thiserror::Error;

use hapi_config::Theme;
use hapi_db::DbError;
use hapi_ingest::IngestError;
use hapi_model::{AdminLevel, ModelError};

/// Failure to find an admin unit in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminLookupError {
    /// The hierarchy has not loaded this level yet.
    #[error("admin{level} has not been built")]
    NotBuilt { level: AdminLevel },

    #[error("admin{level} code {code} not found")]
    MissingAdminCode { level: AdminLevel, code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("resource {0} has not been registered")]
    UnknownResource(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    AdminLookup(#[from] AdminLookupError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("{theme} theme failed: {source}")]
    Theme {
        theme: Theme,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub fn in_theme(self, theme: Theme) -> Self {
        Self::Theme {
            theme,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
