use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{info, info_span, warn};

use hapi_config::Theme;
use hapi_db::Session;
use hapi_ingest::{Column, ThemeResults, canonical_tag};
use hapi_model::{OperationalPresenceRow, RowId};

use super::{Batch, Populator, ThemeContext, ThemeReport, canonical_columns, value_count};
use crate::error::Result;

pub const ORG_NAME_TAG: &str = "#org+name";
pub const ORG_ACRONYM_TAG: &str = "#org+acronym";
pub const ORG_TYPE_NAME_TAG: &str = "#org+type+name";
pub const SECTOR_TAG: &str = "#sector";

/// A fact row waiting for its organisation to be stored.
struct Pending {
    resource_ref: RowId,
    admin2_ref: RowId,
    identity: String,
    sector_code: String,
    start: NaiveDate,
    end: Option<NaiveDate>,
}

/// Which organisations work in which sector, per admin unit.
///
/// Organisations are reconciled through [`crate::OrgResolver`] and written
/// before any presence row, so every row can reference a stored org.
pub struct OperationalPresencePopulator {
    results: ThemeResults,
}

impl OperationalPresencePopulator {
    pub fn new(results: ThemeResults) -> Self {
        Self { results }
    }
}

fn cell(column: Option<&Column>, admin_code: &str, index: usize) -> String {
    column
        .and_then(|column| column.get(admin_code))
        .and_then(|cells| cells.get(index))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn column_for<'a>(
    columns: &BTreeMap<String, &'a Column>,
    tag: &str,
) -> Option<&'a Column> {
    canonical_tag(tag)
        .ok()
        .and_then(|tag| columns.get(&tag).copied())
}

impl<S: Session> Populator<S> for OperationalPresencePopulator {
    fn theme(&self) -> Theme {
        Theme::OperationalPresence
    }

    fn populate(&mut self, ctx: &mut ThemeContext<'_, S>) -> Result<ThemeReport> {
        let _span = info_span!("operational_presence").entered();
        let mut report = ThemeReport::new(Theme::OperationalPresence);
        let mut pending = Vec::new();
        let mut seen: BTreeSet<(RowId, String, String, RowId)> = BTreeSet::new();

        for result in &self.results.datasets {
            ctx.metadata.register(ctx.session, &result.dataset)?;
        }

        for result in &self.results.datasets {
            let identifier = result.dataset.hdx_stub.as_str();

            for (granularity, block) in &result.results {
                let resource_ref = match ctx.metadata.resource_key_for(&block.resource_id) {
                    Ok(id) => id,
                    Err(err) => {
                        ctx.messages.errors.add_message(identifier, &err);
                        report.skipped += value_count(block);
                        continue;
                    }
                };
                let columns = canonical_columns(block);
                let Some(names) = column_for(&columns, ORG_NAME_TAG) else {
                    ctx.messages
                        .errors
                        .add_message(identifier, "Org name missing from dataset");
                    continue;
                };
                let acronyms = column_for(&columns, ORG_ACRONYM_TAG).or(Some(names));
                let type_names = column_for(&columns, ORG_TYPE_NAME_TAG);
                let Some(sectors) = column_for(&columns, SECTOR_TAG) else {
                    ctx.messages
                        .errors
                        .add_message(identifier, "Sector missing from dataset");
                    continue;
                };

                for (admin_code, org_names) in names {
                    for (i, name_orig) in org_names.iter().enumerate() {
                        let acronym_orig = cell(acronyms, admin_code, i);
                        let name_orig = match name_orig.trim() {
                            "" => acronym_orig.clone(),
                            name => name.to_string(),
                        };
                        let sector_orig = cell(Some(sectors), admin_code, i);
                        if sector_orig.is_empty() || name_orig.is_empty() {
                            report.skipped += 1;
                            continue;
                        }

                        let country = ctx.admins.location_of(admin_code, *granularity);
                        let info = ctx.orgs.get_org_info(&name_orig, country);
                        ctx.orgs.record_alias(&name_orig, &info.name);

                        let acronym = info
                            .acronym
                            .clone()
                            .filter(|acronym| !acronym.trim().is_empty())
                            .unwrap_or_else(|| match acronym_orig.as_str() {
                                "" => info.name.clone(),
                                acronym => acronym.to_string(),
                            });

                        let mut type_code = info.type_code.clone();
                        let type_name = cell(type_names, admin_code, i);
                        if type_code.is_none() && !type_name.is_empty() {
                            type_code = ctx.org_types.get_code(&type_name);
                            if type_code.is_none() {
                                ctx.messages.errors.add_missing_value_message(
                                    identifier,
                                    "Org type",
                                    &type_name,
                                );
                            }
                        }
                        if let Some(code) = &type_code
                            && !ctx.org_types.contains_code(code)
                        {
                            ctx.messages.errors.add_missing_value_message(
                                identifier,
                                "Org type code",
                                code,
                            );
                            type_code = None;
                        }

                        let org = ctx
                            .orgs
                            .add_or_match_org(&acronym, &info.name, type_code.as_deref());

                        let Some(sector_code) = ctx.sectors.get_code(&sector_orig) else {
                            ctx.messages.errors.add_missing_value_message(
                                identifier,
                                "Sector",
                                &sector_orig,
                            );
                            report.skipped += 1;
                            continue;
                        };
                        let admin2_ref = match ctx.admins.admin2_ref_for(admin_code, *granularity)
                        {
                            Ok(id) => id,
                            Err(_) => {
                                ctx.messages.warnings.add_missing_value_message(
                                    identifier,
                                    "admin code",
                                    admin_code,
                                );
                                report.skipped += 1;
                                continue;
                            }
                        };

                        let key = (
                            resource_ref,
                            org.identity.clone(),
                            sector_code.clone(),
                            admin2_ref,
                        );
                        if !seen.insert(key) {
                            report.duplicates += 1;
                            continue;
                        }
                        pending.push(Pending {
                            resource_ref,
                            admin2_ref,
                            identity: org.identity,
                            sector_code,
                            start: result.time_period.start,
                            end: result.time_period.end,
                        });
                    }
                }
            }
        }

        // Orgs are reference rows and are committed before any presence row.
        ctx.orgs.flush(ctx.session)?;
        let mut batch = Batch::new(ctx.commit_limit);
        for row in pending {
            let Some(org_ref) = ctx.orgs.org_ref(&row.identity) else {
                ctx.messages
                    .errors
                    .add_missing_value_message("operational presence", "org", &row.identity);
                report.skipped += 1;
                continue;
            };
            batch.push(
                ctx.session,
                OperationalPresenceRow {
                    resource_ref: row.resource_ref,
                    admin2_ref: row.admin2_ref,
                    org_ref,
                    sector_code: row.sector_code,
                    reference_period_start: row.start,
                    reference_period_end: row.end,
                },
            )?;
        }
        report.rows = batch.finish(ctx.session)?;

        if report.duplicates > 0 {
            warn!(
                "There were {} duplicate operational presence rows!",
                report.duplicates
            );
        }
        info!(rows = report.rows, skipped = report.skipped, "populated operational presence");
        Ok(report)
    }
}
