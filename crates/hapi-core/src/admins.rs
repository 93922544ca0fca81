//! The admin1/admin2 hierarchy and its connector rows.
//!
//! Every location gets an unspecified admin1 (`{location}-XXX`) and every
//! admin1, real or unspecified, gets an unspecified admin2
//! (`{admin1}-XXX`). Values reported at national or admin1 granularity are
//! attached to those connectors, so every fact row can reference admin2.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use hapi_db::{Record, Session, Table};
use hapi_ingest::{GeoRow, IngestError};
use hapi_model::{Admin1, Admin2, AdminLevel, Granularity, RowId, admin1_connector_code};

use crate::error::{AdminLookupError, Result};
use crate::locations::Locations;

type Lookup<T> = std::result::Result<T, AdminLookupError>;

/// A stored admin unit as seen by its children and by fact rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNode {
    pub id: RowId,
    pub start: NaiveDate,
    /// Code of the location the unit belongs to.
    pub location: String,
}

/// Counters for one [`AdminHierarchy::build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub admin1_rows: usize,
    pub admin2_rows: usize,
    pub connectors: usize,
    /// Admin2 rows attached to a location's unspecified admin1.
    pub rerouted: usize,
    /// Rows dropped because their parent is unknown.
    pub skipped: usize,
}

/// Code to stored unit for each admin level of the tracked countries.
#[derive(Debug, Clone)]
pub struct AdminHierarchy {
    commit_limit: usize,
    admin1: Option<BTreeMap<String, AdminNode>>,
    admin2: Option<BTreeMap<String, AdminNode>>,
}

impl AdminHierarchy {
    pub fn new(commit_limit: usize) -> Self {
        Self {
            commit_limit: commit_limit.max(1),
            admin1: None,
            admin2: None,
        }
    }

    /// Populate admin1 then admin2 from the geographic reference.
    ///
    /// Only rows whose country is in `locations` are used. A row whose
    /// parent cannot be found is skipped with a warning, except admin2
    /// codes listed in `orphan_admin2s`, which are attached to the
    /// unspecified admin1 of the mapped location. Connector rows that
    /// already exist are left alone, so the build can be repeated against
    /// the same warehouse.
    ///
    /// `rows` is read once; the tracked subset is buffered by level so
    /// admin1 can be stored before any admin2 row is resolved.
    pub fn build<S, I>(
        &mut self,
        session: &mut S,
        locations: &Locations,
        rows: I,
        orphan_admin2s: &BTreeMap<String, String>,
    ) -> Result<BuildStats>
    where
        S: Session,
        I: IntoIterator<Item = std::result::Result<GeoRow, IngestError>>,
    {
        let _span = info_span!("admins").entered();
        let mut stats = BuildStats::default();

        let mut level_one = Vec::new();
        let mut level_two = Vec::new();
        for row in rows {
            let row = row?;
            if locations.get(&row.country_code).is_none() {
                continue;
            }
            match row.admin_level.parse::<AdminLevel>() {
                Ok(AdminLevel::One) => level_one.push(row),
                Ok(AdminLevel::Two) => level_two.push(row),
                Err(_) => {
                    debug!(
                        code = %row.adm_code,
                        line = row.line,
                        level = %row.admin_level,
                        "skipping row with unknown admin level"
                    );
                    stats.skipped += 1;
                }
            }
        }

        info!("Populating admin1 table");
        let mut staged = Vec::new();
        for row in level_one {
            let parent = row
                .adm_code_parent
                .clone()
                .unwrap_or_else(|| row.country_code.clone());
            let Some(location) = locations.get(&parent) else {
                warn!("Missing parent {parent} for code {}", row.adm_code);
                stats.skipped += 1;
                continue;
            };
            staged.push(Admin1 {
                location_ref: location.id,
                reference_period_start: start_or_parent(&row, location.start),
                code: row.adm_code,
                name: row.adm_name,
                is_unspecified: false,
            });
            if staged.len() >= self.commit_limit {
                stats.admin1_rows += flush(session, &mut staged)?;
            }
        }
        stats.admin1_rows += flush(session, &mut staged)?;

        for (code, location) in locations.iter() {
            let connector = Admin1::unspecified(location.id, code, location.start);
            if !session.exists(Table::Admin1, &connector.code)? {
                session.add(&connector)?;
                stats.connectors += 1;
            }
        }
        session.commit()?;
        let admin1 = load_admin1(session, locations)?;

        info!("Populating admin2 table");
        let mut staged = Vec::new();
        for row in level_two {
            let parent = row.adm_code_parent.clone().unwrap_or_default();
            let node = match admin1.get(&parent) {
                Some(node) => node,
                None => {
                    let connector = orphan_admin2s
                        .get(&row.adm_code)
                        .and_then(|location| admin1.get(&admin1_connector_code(location)));
                    let Some(node) = connector else {
                        warn!("Missing parent {parent} for code {}", row.adm_code);
                        stats.skipped += 1;
                        continue;
                    };
                    debug!(code = %row.adm_code, admin1 = node.id, "rerouted orphan admin2");
                    stats.rerouted += 1;
                    node
                }
            };
            staged.push(Admin2 {
                admin1_ref: node.id,
                reference_period_start: start_or_parent(&row, node.start),
                code: row.adm_code,
                name: row.adm_name,
                is_unspecified: false,
            });
            if staged.len() >= self.commit_limit {
                stats.admin2_rows += flush(session, &mut staged)?;
            }
        }
        stats.admin2_rows += flush(session, &mut staged)?;

        for (code, node) in &admin1 {
            let connector = Admin2::unspecified(node.id, code, node.start);
            if !session.exists(Table::Admin2, &connector.code)? {
                session.add(&connector)?;
                stats.connectors += 1;
            }
        }
        session.commit()?;
        self.admin2 = Some(load_admin2(session, &admin1)?);
        self.admin1 = Some(admin1);

        info!(
            admin1 = stats.admin1_rows,
            admin2 = stats.admin2_rows,
            connectors = stats.connectors,
            rerouted = stats.rerouted,
            skipped = stats.skipped,
            "built admin hierarchy"
        );
        Ok(stats)
    }

    fn level(&self, level: AdminLevel) -> Lookup<&BTreeMap<String, AdminNode>> {
        match level {
            AdminLevel::One => self.admin1.as_ref(),
            AdminLevel::Two => self.admin2.as_ref(),
        }
        .ok_or(AdminLookupError::NotBuilt { level })
    }

    pub fn node(&self, level: AdminLevel, code: &str) -> Lookup<&AdminNode> {
        self.level(level)?
            .get(code)
            .ok_or_else(|| AdminLookupError::MissingAdminCode {
                level,
                code: code.to_string(),
            })
    }

    /// Id of the unit with `code` at `level`.
    pub fn lookup(&self, level: AdminLevel, code: &str) -> Lookup<RowId> {
        self.node(level, code).map(|node| node.id)
    }

    /// Which level a p-code belongs to, admin1 first.
    ///
    /// A code found at neither level is reported missing from admin2, the
    /// last level searched.
    pub fn admin_level_of(&self, pcode: &str) -> Lookup<AdminLevel> {
        AdminLevel::ALL
            .into_iter()
            .find(|level| self.level(*level).is_ok_and(|data| data.contains_key(pcode)))
            .ok_or_else(|| AdminLookupError::MissingAdminCode {
                level: AdminLevel::Two,
                code: pcode.to_string(),
            })
    }

    /// Admin2 id for a code reported at `granularity`.
    pub fn admin2_ref_for(&self, code: &str, granularity: Granularity) -> Lookup<RowId> {
        self.lookup(AdminLevel::Two, &granularity.admin2_code(code))
    }

    /// Location code of a code reported at `granularity`, if known.
    pub fn location_of<'a>(&'a self, code: &'a str, granularity: Granularity) -> Option<&'a str> {
        let level = match granularity {
            Granularity::National => return Some(code),
            Granularity::AdminOne => AdminLevel::One,
            Granularity::AdminTwo => AdminLevel::Two,
        };
        self.node(level, code).ok().map(|node| node.location.as_str())
    }

    /// Codes at `level`, empty before the level is built.
    pub fn codes(&self, level: AdminLevel) -> impl Iterator<Item = &str> {
        self.level(level)
            .into_iter()
            .flat_map(|data| data.keys().map(String::as_str))
    }
}

fn start_or_parent(row: &GeoRow, parent_start: NaiveDate) -> NaiveDate {
    row.date_start.unwrap_or_else(|| {
        warn!(code = %row.adm_code, line = row.line, "missing start date, using parent's");
        parent_start
    })
}

fn load_admin1<S: Session>(
    session: &S,
    locations: &Locations,
) -> Result<BTreeMap<String, AdminNode>> {
    let by_id: BTreeMap<RowId, &str> = locations.iter().map(|(code, l)| (l.id, code)).collect();
    Ok(session
        .load::<Admin1>()?
        .into_iter()
        .filter_map(|(id, admin)| {
            let location = by_id.get(&admin.location_ref)?;
            Some((
                admin.code,
                AdminNode {
                    id,
                    start: admin.reference_period_start,
                    location: (*location).to_string(),
                },
            ))
        })
        .collect())
}

fn load_admin2<S: Session>(
    session: &S,
    admin1: &BTreeMap<String, AdminNode>,
) -> Result<BTreeMap<String, AdminNode>> {
    let by_id: BTreeMap<RowId, &str> = admin1
        .values()
        .map(|node| (node.id, node.location.as_str()))
        .collect();
    Ok(session
        .load::<Admin2>()?
        .into_iter()
        .filter_map(|(id, admin)| {
            let location = by_id.get(&admin.admin1_ref)?;
            Some((
                admin.code,
                AdminNode {
                    id,
                    start: admin.reference_period_start,
                    location: (*location).to_string(),
                },
            ))
        })
        .collect())
}

fn flush<S: Session, R: Record>(session: &mut S, staged: &mut Vec<R>) -> Result<usize> {
    let inserted = session.insert_batch(staged)?;
    session.commit()?;
    staged.clear();
    Ok(inserted)
}
