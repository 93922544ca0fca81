#![deny(unsafe_code)]

//! Pipeline configuration.
//!
//! A single TOML file names the tracked countries, the static overrides and
//! alias maps, and where every input lives. Relative paths are resolved
//! against the directory containing the file.

mod error;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hapi_map::clean_name;

pub use error::{ConfigError, Result};

pub const DEFAULT_COMMIT_LIMIT: usize = 1000;

fn default_commit_limit() -> usize {
    DEFAULT_COMMIT_LIMIT
}

fn default_database() -> PathBuf {
    PathBuf::from("hapi.sqlite")
}

/// A fact-table theme this pipeline can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Population,
    OperationalPresence,
}

impl Theme {
    /// Themes in run order.
    pub const ALL: [Theme; 2] = [Theme::Population, Theme::OperationalPresence];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Population => "population",
            Self::OperationalPresence => "operational_presence",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownTheme(s.to_string()))
    }
}

/// Reference sources every run reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    pub countries: PathBuf,
    pub admins: PathBuf,
    pub org_aliases: PathBuf,
    pub sectors: PathBuf,
    pub org_types: PathBuf,
    /// Extra dataset descriptors registered before any theme runs.
    #[serde(default)]
    pub metadata: Option<PathBuf>,
}

/// Result set per theme; unconfigured themes are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Themes {
    #[serde(default)]
    pub population: Option<PathBuf>,
    #[serde(default)]
    pub operational_presence: Option<PathBuf>,
}

impl Themes {
    pub fn path(&self, theme: Theme) -> Option<&Path> {
        match theme {
            Theme::Population => self.population.as_deref(),
            Theme::OperationalPresence => self.operational_presence.as_deref(),
        }
    }

    /// Configured themes in run order.
    pub fn configured(&self) -> Vec<(Theme, &Path)> {
        Theme::ALL
            .into_iter()
            .filter_map(|theme| self.path(theme).map(|path| (theme, path)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Rows written between commits.
    #[serde(default = "default_commit_limit")]
    pub commit_limit: usize,
    pub tracked_countries: Vec<String>,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Admin2 p-codes whose parent is missing, mapped to the location whose
    /// unspecified admin1 should adopt them.
    #[serde(default)]
    pub orphan_admin2s: BTreeMap<String, String>,
    /// Known unofficial sector names (cleaned) to sector codes.
    #[serde(default)]
    pub sector_map: BTreeMap<String, String>,
    /// Known unofficial organisation type names (cleaned) to type codes.
    #[serde(default)]
    pub org_type_map: BTreeMap<String, String>,
    pub sources: Sources,
    #[serde(default)]
    pub themes: Themes,
}

impl PipelineConfig {
    pub fn tracked(&self) -> BTreeSet<&str> {
        self.tracked_countries.iter().map(String::as_str).collect()
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.commit_limit == 0 {
            return Err(ConfigError::InvalidCommitLimit);
        }
        if self.tracked_countries.is_empty() {
            return Err(ConfigError::NoTrackedCountries);
        }

        let mut seen = BTreeSet::new();
        for code in &self.tracked_countries {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(ConfigError::InvalidCountryCode { code: code.clone() });
            }
            if !seen.insert(code.as_str()) {
                return Err(ConfigError::DuplicateCountry { code: code.clone() });
            }
        }

        for (admin2, country) in &self.orphan_admin2s {
            if !seen.contains(country.as_str()) {
                return Err(ConfigError::UntrackedOrphanTarget {
                    admin2: admin2.clone(),
                    country: country.clone(),
                });
            }
        }

        check_alias_map("sector_map", &self.sector_map)?;
        check_alias_map("org_type_map", &self.org_type_map)?;
        Ok(())
    }

    /// Make every relative path relative to `base` instead.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.database);
        resolve(&mut self.sources.countries);
        resolve(&mut self.sources.admins);
        resolve(&mut self.sources.org_aliases);
        resolve(&mut self.sources.sectors);
        resolve(&mut self.sources.org_types);
        for path in [
            &mut self.sources.metadata,
            &mut self.themes.population,
            &mut self.themes.operational_presence,
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }
    }
}

fn check_alias_map(map: &'static str, entries: &BTreeMap<String, String>) -> Result<()> {
    for (key, code) in entries {
        let expected = clean_name(key);
        if &expected != key {
            return Err(ConfigError::UnnormalisedKey {
                map,
                key: key.clone(),
                expected,
            });
        }
        if code.trim().is_empty() {
            return Err(ConfigError::EmptyCode {
                map,
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Parse configuration text without resolving paths.
pub fn parse_config(text: &str, origin: &Path) -> Result<PipelineConfig> {
    let config: PipelineConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
        path: origin.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Read, validate and resolve the configuration at `path`.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&text, path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    debug!(
        path = %path.display(),
        countries = config.tracked_countries.len(),
        commit_limit = config.commit_limit,
        "loaded pipeline config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
tracked_countries = ["AFG", "SSD"]

[sources]
countries = "countries.csv"
admins = "admins.csv"
org_aliases = "org_aliases.csv"
sectors = "sectors.csv"
org_types = "org_types.csv"
"#;

    fn parse(text: &str) -> Result<PipelineConfig> {
        parse_config(text, Path::new("hapi.toml"))
    }

    #[test]
    fn defaults_apply() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.commit_limit, DEFAULT_COMMIT_LIMIT);
        assert_eq!(config.database, PathBuf::from("hapi.sqlite"));
        assert!(config.themes.configured().is_empty());
        assert!(config.sources.metadata.is_none());
    }

    #[test]
    fn rejects_zero_commit_limit() {
        let text = format!("commit_limit = 0\n{MINIMAL}");
        assert!(matches!(parse(&text), Err(ConfigError::InvalidCommitLimit)));
    }

    #[test]
    fn rejects_lowercase_country() {
        let text = MINIMAL.replace("\"SSD\"", "\"ssd\"");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.to_string(), "tracked country ssd is not an upper-case ISO3 code");
    }

    #[test]
    fn rejects_orphan_for_untracked_country() {
        let text = format!("{MINIMAL}\n[orphan_admin2s]\nSD0001 = \"SDN\"\n");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::UntrackedOrphanTarget { .. })
        ));
    }

    #[test]
    fn alias_keys_must_be_clean() {
        let text = format!("{MINIMAL}\n[sector_map]\n\"Santé\" = \"HEA\"\n");
        match parse(&text).unwrap_err() {
            ConfigError::UnnormalisedKey { map, expected, .. } => {
                assert_eq!(map, "sector_map");
                assert_eq!(expected, "sante");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("commit_limt = 10\n{MINIMAL}");
        assert!(matches!(parse(&text), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn themes_parse_by_name() {
        assert_eq!("population".parse::<Theme>().unwrap(), Theme::Population);
        assert_eq!(
            "operational_presence".parse::<Theme>().unwrap(),
            Theme::OperationalPresence
        );
        assert!("funding".parse::<Theme>().is_err());
    }
}
