//! Tracked countries.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{info, warn};

use hapi_db::Session;
use hapi_ingest::{CountryRow, IngestError};
use hapi_model::{Location, RowId};

use crate::error::Result;

/// A stored location as referenced by its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRef {
    pub id: RowId,
    pub start: NaiveDate,
}

/// Location code to stored row, for tracked countries only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locations {
    data: BTreeMap<String, LocationRef>,
}

impl Locations {
    /// Insert every tracked country from `rows` and read the ids back.
    ///
    /// Tracked countries absent from the reference are warned about; they
    /// get no admin hierarchy.
    pub fn populate<S, I>(session: &mut S, rows: I, tracked: &BTreeSet<&str>) -> Result<Self>
    where
        S: Session,
        I: IntoIterator<Item = std::result::Result<CountryRow, IngestError>>,
    {
        let mut staged = Vec::new();
        for row in rows {
            let row = row?;
            if !tracked.contains(row.country_code_iso3.as_str()) {
                continue;
            }
            staged.push(Location {
                code: row.country_code_iso3,
                name: row.country_name_preferred,
                reference_period_start: row.date_start,
            });
        }
        let inserted = session.insert_batch(&staged)?;
        session.commit()?;

        let locations = Self::load(session, tracked)?;
        for code in tracked {
            if !locations.data.contains_key(*code) {
                warn!(country = %code, "tracked country missing from country reference");
            }
        }
        info!(
            locations = locations.len(),
            inserted, "populated locations"
        );
        Ok(locations)
    }

    /// Read tracked locations already in the warehouse.
    pub fn load<S: Session>(session: &S, tracked: &BTreeSet<&str>) -> Result<Self> {
        let data = session
            .load::<Location>()?
            .into_iter()
            .filter(|(_, location)| tracked.contains(location.code.as_str()))
            .map(|(id, location)| {
                (
                    location.code,
                    LocationRef {
                        id,
                        start: location.reference_period_start,
                    },
                )
            })
            .collect();
        Ok(Self { data })
    }

    pub fn get(&self, code: &str) -> Option<LocationRef> {
        self.data.get(code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LocationRef)> {
        self.data.iter().map(|(code, loc)| (code.as_str(), *loc))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hapi_db::{Table, Warehouse};

    fn country(code: &str, name: &str) -> std::result::Result<CountryRow, IngestError> {
        Ok(CountryRow {
            country_code_iso3: code.to_string(),
            country_name_preferred: name.to_string(),
            date_start: NaiveDate::from_ymd_opt(2021, 11, 17).unwrap(),
        })
    }

    #[test]
    fn keeps_tracked_countries_only() {
        let mut db = Warehouse::open_in_memory().unwrap();
        let tracked = BTreeSet::from(["AFG", "COD"]);
        let rows = vec![
            country("AFG", "Afghanistan"),
            country("FRA", "France"),
            country("COD", "Democratic Republic of the Congo"),
        ];
        let locations = Locations::populate(&mut db, rows, &tracked).unwrap();

        assert_eq!(locations.len(), 2);
        assert!(locations.get("FRA").is_none());
        assert_eq!(db.count(Table::Location).unwrap(), 2);

        let again = Locations::populate(&mut db, vec![country("AFG", "Afghanistan")], &tracked)
            .unwrap();
        assert_eq!(again, locations);
        assert_eq!(db.count(Table::Location).unwrap(), 2);
    }
}
