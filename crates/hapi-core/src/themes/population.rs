use std::collections::BTreeSet;

use tracing::{info, info_span, warn};

use hapi_config::Theme;
use hapi_db::Session;
use hapi_ingest::{
    ThemeResults, gender_and_age_range, min_and_max_age, normalize_tag, validate_population_tag,
};
use hapi_model::{PopulationRow, RowId};

use super::{Batch, Populator, ThemeContext, ThemeReport, value_count};
use crate::error::Result;

/// Population counts by admin unit, gender and age range.
///
/// Every column tag must be a population tag; anything else fails the
/// theme.
pub struct PopulationPopulator {
    results: ThemeResults,
}

impl PopulationPopulator {
    pub fn new(results: ThemeResults) -> Self {
        Self { results }
    }
}

/// Parse a reported count, accepting integral floats such as `1200.0`.
fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        let float = value.parse::<f64>().ok()?;
        (float.is_finite() && float.fract() == 0.0).then_some(float as i64)
    })
}

impl<S: Session> Populator<S> for PopulationPopulator {
    fn theme(&self) -> Theme {
        Theme::Population
    }

    fn populate(&mut self, ctx: &mut ThemeContext<'_, S>) -> Result<ThemeReport> {
        let _span = info_span!("population").entered();
        let mut report = ThemeReport::new(Theme::Population);
        let mut batch = Batch::new(ctx.commit_limit);
        let mut seen: BTreeSet<(RowId, RowId, String, String)> = BTreeSet::new();

        // Provenance is committed up front; fact rows are not.
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

                for (raw_tag, column) in &block.columns {
                    let tag = normalize_tag(raw_tag)?;
                    validate_population_tag(&tag)?;
                    let (gender, age_range) = gender_and_age_range(&tag);
                    let (min_age, max_age) = min_and_max_age(&age_range)?;

                    for (admin_code, cells) in column {
                        let Some(value) = cells.iter().find(|v| !v.trim().is_empty()) else {
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
                        let Some(population) = parse_count(value) else {
                            ctx.messages.errors.add_message(
                                identifier,
                                format_args!("{tag} value {value} for {admin_code} is not a count"),
                            );
                            report.skipped += 1;
                            continue;
                        };

                        let key = (resource_ref, admin2_ref, gender.clone(), age_range.clone());
                        if !seen.insert(key) {
                            report.duplicates += 1;
                            continue;
                        }
                        batch.push(
                            ctx.session,
                            PopulationRow {
                                resource_ref,
                                admin2_ref,
                                gender: gender.clone(),
                                age_range: age_range.clone(),
                                min_age,
                                max_age,
                                population,
                                reference_period_start: result.time_period.start,
                                reference_period_end: result.time_period.end,
                            },
                        )?;
                    }
                }
            }
        }

        report.rows = batch.finish(ctx.session)?;
        if report.duplicates > 0 {
            warn!("There were {} duplicate population rows!", report.duplicates);
        }
        info!(rows = report.rows, skipped = report.skipped, "populated population");
        Ok(report)
    }
}
