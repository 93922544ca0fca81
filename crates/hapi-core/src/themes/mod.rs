//! Theme populators turn reported values into fact rows.
//!
//! Each theme consumes the result set produced for it and writes through the
//! same [`ThemeContext`]: admin lookups, code tables, org reconciliation and
//! provenance are shared so reference data is only built once per run.

mod operational_presence;
mod population;

use std::collections::BTreeMap;

use serde::Serialize;

use hapi_config::Theme;
use hapi_db::{Record, Session};
use hapi_ingest::{Cells, Column, GranularityResult, canonical_tag};

use crate::admins::AdminHierarchy;
use crate::error::Result;
use crate::messages::RunMessages;
use crate::metadata::Metadata;
use crate::org::OrgResolver;
use crate::org_type::OrgTypeResolver;
use crate::sector::SectorResolver;

pub use operational_presence::OperationalPresencePopulator;
pub use population::PopulationPopulator;

/// Everything a populator may read or write.
pub struct ThemeContext<'a, S> {
    pub session: &'a mut S,
    pub admins: &'a AdminHierarchy,
    pub orgs: &'a mut OrgResolver,
    pub sectors: &'a mut SectorResolver,
    pub org_types: &'a mut OrgTypeResolver,
    pub metadata: &'a mut Metadata,
    pub messages: &'a mut RunMessages,
    pub commit_limit: usize,
}

/// Outcome of one populator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeReport {
    pub theme: Theme,
    pub rows: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl ThemeReport {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            rows: 0,
            duplicates: 0,
            skipped: 0,
        }
    }
}

pub trait Populator<S: Session> {
    fn theme(&self) -> Theme;

    fn populate(&mut self, ctx: &mut ThemeContext<'_, S>) -> Result<ThemeReport>;
}

/// Fact rows inserted in chunks of at most `limit` rows.
///
/// Nothing is committed here: the pipeline commits once the whole theme has
/// succeeded, so a failing theme leaves no fact rows behind.
struct Batch<R> {
    rows: Vec<R>,
    limit: usize,
    written: usize,
}

impl<R: Record> Batch<R> {
    fn new(limit: usize) -> Self {
        Self {
            rows: Vec::new(),
            limit: limit.max(1),
            written: 0,
        }
    }

    fn push<S: Session>(&mut self, session: &mut S, row: R) -> Result<()> {
        self.rows.push(row);
        if self.rows.len() >= self.limit {
            self.write(session)?;
        }
        Ok(())
    }

    fn write<S: Session>(&mut self, session: &mut S) -> Result<()> {
        self.written += session.insert_batch(&self.rows)?;
        self.rows.clear();
        Ok(())
    }

    fn finish<S: Session>(mut self, session: &mut S) -> Result<usize> {
        self.write(session)?;
        Ok(self.written)
    }
}

/// Columns of a result block keyed by canonical tag.
///
/// Tags that do not parse are dropped.
fn canonical_columns(block: &GranularityResult) -> BTreeMap<String, &Column> {
    block
        .columns
        .iter()
        .filter_map(|(tag, column)| canonical_tag(tag).ok().map(|tag| (tag, column)))
        .collect()
}

fn value_count(block: &GranularityResult) -> usize {
    block
        .columns
        .values()
        .flat_map(|column| column.values())
        .map(Cells::len)
        .sum()
}
