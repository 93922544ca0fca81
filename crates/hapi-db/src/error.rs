use std::path::PathBuf;

use thiserror::Error;

use crate::table::Table;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{table}: {source}")]
    Sqlite {
        table: Table,
        #[source]
        source: rusqlite::Error,
    },

    #[error("transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("table {0} has no natural key")]
    NoNaturalKey(Table),

    #[error("{table}.{column}: {reason}")]
    Decode {
        table: Table,
        column: &'static str,
        reason: String,
    },
}

impl DbError {
    pub(crate) fn sqlite(table: Table) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Sqlite { table, source }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
