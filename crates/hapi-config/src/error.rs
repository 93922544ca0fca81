use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("commit_limit must be greater than zero")]
    InvalidCommitLimit,

    #[error("no tracked countries configured")]
    NoTrackedCountries,

    #[error("tracked country {code} is not an upper-case ISO3 code")]
    InvalidCountryCode { code: String },

    #[error("tracked country {code} listed more than once")]
    DuplicateCountry { code: String },

    #[error("orphan admin2 {admin2} targets untracked country {country}")]
    UntrackedOrphanTarget { admin2: String, country: String },

    #[error("{map} key '{key}' is not normalised (expected '{expected}')")]
    UnnormalisedKey {
        map: &'static str,
        key: String,
        expected: String,
    },

    #[error("{map} maps '{key}' to an empty code")]
    EmptyCode { map: &'static str, key: String },

    #[error("unknown theme '{0}' (expected 'population' or 'operational_presence')")]
    UnknownTheme(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
