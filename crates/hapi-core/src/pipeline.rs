//! Ordered execution of a whole run.
//!
//! Reference data is built first (locations, admins, org types, sectors,
//! org aliases, metadata); any failure there aborts the run. Themes run
//! afterwards, each isolated: a failing theme is rolled back and recorded,
//! and the remaining themes still run. A theme's fact rows are committed
//! together once it succeeds, so a failed theme leaves none behind.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;
use tracing::{error, info, info_span, warn};

use hapi_config::{PipelineConfig, Theme};
use hapi_db::{Session, Table};
use hapi_ingest::{
    CountryRow, GeoRow, HxlReader, OrgAliasRow, OrgTypeRow, SectorRow, load_metadata,
    load_theme_results, read_hxl,
};

use crate::admins::{AdminHierarchy, BuildStats};
use crate::error::Result;
use crate::locations::Locations;
use crate::messages::RunMessages;
use crate::metadata::Metadata;
use crate::org::OrgResolver;
use crate::org_type::OrgTypeResolver;
use crate::sector::SectorResolver;
use crate::themes::{
    OperationalPresencePopulator, Populator, PopulationPopulator, ThemeContext, ThemeReport,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThemeStatus {
    Completed(ThemeReport),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeOutcome {
    pub theme: Theme,
    #[serde(flatten)]
    pub status: ThemeStatus,
}

/// What a run wrote and what went wrong along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Row count of every warehouse table after the run.
    pub tables: Vec<(Table, usize)>,
    pub admins: BuildStats,
    pub themes: Vec<ThemeOutcome>,
    pub messages: RunMessages,
}

impl RunSummary {
    pub fn failed_themes(&self) -> impl Iterator<Item = &ThemeOutcome> {
        self.themes
            .iter()
            .filter(|outcome| matches!(outcome.status, ThemeStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed_themes().next().is_some()
    }

    pub fn rows(&self, table: Table) -> usize {
        self.tables
            .iter()
            .find(|(t, _)| *t == table)
            .map_or(0, |(_, rows)| *rows)
    }
}

pub struct Pipelines<S> {
    config: PipelineConfig,
    session: S,
    selected: Vec<Theme>,
    locations: Locations,
    admins: AdminHierarchy,
    admin_stats: BuildStats,
    orgs: OrgResolver,
    sectors: SectorResolver,
    org_types: OrgTypeResolver,
    metadata: Metadata,
    messages: RunMessages,
    outcomes: Vec<ThemeOutcome>,
}

impl<S: Session> Pipelines<S> {
    pub fn new(config: PipelineConfig, session: S) -> Self {
        let limit = config.commit_limit;
        Self {
            admins: AdminHierarchy::new(limit),
            orgs: OrgResolver::new(limit),
            sectors: SectorResolver::new(config.sector_map.clone()),
            org_types: OrgTypeResolver::new(config.org_type_map.clone()),
            config,
            session,
            selected: Vec::new(),
            locations: Locations::default(),
            admin_stats: BuildStats::default(),
            metadata: Metadata::new(),
            messages: RunMessages::new(),
            outcomes: Vec::new(),
        }
    }

    /// Restrict the run to `themes`; an empty selection runs every
    /// configured theme.
    #[must_use]
    pub fn with_themes(mut self, themes: Vec<Theme>) -> Self {
        self.selected = themes;
        self
    }

    /// Build reference data, then populate each selected theme.
    pub fn run(&mut self) -> Result<()> {
        self.populate_reference()?;
        self.populate_themes();
        Ok(())
    }

    /// Flush collected messages to the log and summarise the warehouse.
    pub fn output(&self) -> Result<RunSummary> {
        self.messages.log_all();
        let tables = Table::ALL
            .into_iter()
            .map(|table| Ok((table, self.session.count(table)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(RunSummary {
            tables,
            admins: self.admin_stats,
            themes: self.outcomes.clone(),
            messages: self.messages.clone(),
        })
    }

    /// Raw organisation names grouped by the canonical name they matched.
    pub fn aliases(&self) -> &BTreeMap<String, BTreeSet<String>> {
        self.orgs.aliases()
    }

    pub fn admins(&self) -> &AdminHierarchy {
        &self.admins
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    fn populate_reference(&mut self) -> Result<()> {
        let sources = &self.config.sources;
        let tracked = self.config.tracked();

        {
            let _span = info_span!("locations").entered();
            let rows = HxlReader::open(&sources.countries)?.typed::<CountryRow>();
            self.locations = Locations::populate(&mut self.session, rows, &tracked)?;
        }

        let rows = HxlReader::open(&sources.admins)?.typed::<GeoRow>();
        self.admin_stats = self.admins.build(
            &mut self.session,
            &self.locations,
            rows,
            &self.config.orphan_admin2s,
        )?;

        {
            let _span = info_span!("org_types").entered();
            let rows = read_hxl::<OrgTypeRow>(&sources.org_types)?;
            self.org_types
                .populate(&mut self.session, rows.into_iter().map(|row| row.0))?;
        }
        {
            let _span = info_span!("sectors").entered();
            let rows = read_hxl::<SectorRow>(&sources.sectors)?;
            self.sectors
                .populate(&mut self.session, rows.into_iter().map(|row| row.0))?;
        }
        {
            let _span = info_span!("orgs").entered();
            let rows = read_hxl::<OrgAliasRow>(&sources.org_aliases)?;
            self.orgs.load_alias_table(rows);
            self.orgs.preload(&self.session)?;
        }

        if let Some(path) = &sources.metadata {
            let _span = info_span!("metadata").entered();
            for dataset in load_metadata(path)? {
                self.metadata.register(&mut self.session, &dataset)?;
            }
        }
        Ok(())
    }

    fn themes_to_run(&self) -> Vec<(Theme, std::path::PathBuf)> {
        let configured = self.config.themes.configured();
        if self.selected.is_empty() {
            return configured
                .into_iter()
                .map(|(theme, path)| (theme, path.to_path_buf()))
                .collect();
        }
        self.selected
            .iter()
            .filter_map(|theme| {
                let path = self.config.themes.path(*theme);
                if path.is_none() {
                    warn!(%theme, "selected theme has no configured result set");
                }
                path.map(|path| (*theme, path.to_path_buf()))
            })
            .collect()
    }

    fn populate_themes(&mut self) {
        for (theme, path) in self.themes_to_run() {
            let status = match self.populate_theme(theme, &path) {
                Ok(report) => ThemeStatus::Completed(report),
                Err(err) => {
                    let err = err.in_theme(theme);
                    error!(%theme, error = %err, "theme failed");
                    if let Err(rollback) = self.session.rollback() {
                        error!(%theme, error = %rollback, "rollback failed");
                    }
                    self.messages.errors.add_message(theme.as_str(), &err);
                    ThemeStatus::Failed {
                        error: err.to_string(),
                    }
                }
            };
            self.outcomes.push(ThemeOutcome { theme, status });
        }
    }

    fn populate_theme(&mut self, theme: Theme, path: &Path) -> Result<ThemeReport> {
        let _span = info_span!("theme", %theme).entered();
        let results = load_theme_results(path)?;
        let mut ctx = ThemeContext {
            session: &mut self.session,
            admins: &self.admins,
            orgs: &mut self.orgs,
            sectors: &mut self.sectors,
            org_types: &mut self.org_types,
            metadata: &mut self.metadata,
            messages: &mut self.messages,
            commit_limit: self.config.commit_limit,
        };
        let report = match theme {
            Theme::Population => PopulationPopulator::new(results).populate(&mut ctx),
            Theme::OperationalPresence => {
                OperationalPresencePopulator::new(results).populate(&mut ctx)
            }
        }?;
        self.session.commit()?;
        info!(
            %theme,
            rows = report.rows,
            duplicates = report.duplicates,
            "theme complete"
        );
        Ok(report)
    }
}
