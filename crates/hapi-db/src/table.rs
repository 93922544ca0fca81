//! Warehouse tables and their column layout.

use std::fmt;

/// A table of the HAPI warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Location,
    Admin1,
    Admin2,
    OrgType,
    Sector,
    Org,
    Dataset,
    Resource,
    Population,
    OperationalPresence,
}

impl Table {
    /// Tables in dependency order (parents before children).
    pub const ALL: [Table; 10] = [
        Table::Location,
        Table::Admin1,
        Table::Admin2,
        Table::OrgType,
        Table::Sector,
        Table::Org,
        Table::Dataset,
        Table::Resource,
        Table::Population,
        Table::OperationalPresence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Admin1 => "admin1",
            Self::Admin2 => "admin2",
            Self::OrgType => "org_type",
            Self::Sector => "sector",
            Self::Org => "org",
            Self::Dataset => "dataset",
            Self::Resource => "resource",
            Self::Population => "population",
            Self::OperationalPresence => "operational_presence",
        }
    }

    /// Columns written on insert, excluding the surrogate `id`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Location => &["code", "name", "reference_period_start"],
            Self::Admin1 => &[
                "location_ref",
                "code",
                "name",
                "is_unspecified",
                "reference_period_start",
            ],
            Self::Admin2 => &[
                "admin1_ref",
                "code",
                "name",
                "is_unspecified",
                "reference_period_start",
            ],
            Self::OrgType => &["code", "description"],
            Self::Sector => &["code", "name"],
            Self::Org => &[
                "identity",
                "acronym",
                "name",
                "org_type_code",
                "reference_period_start",
            ],
            Self::Dataset => &[
                "hdx_id",
                "hdx_stub",
                "title",
                "hdx_provider_stub",
                "hdx_provider_name",
            ],
            Self::Resource => &[
                "dataset_ref",
                "hdx_id",
                "name",
                "format",
                "update_date",
                "is_hxl",
                "download_url",
                "content_sha256",
            ],
            Self::Population => &[
                "resource_ref",
                "admin2_ref",
                "gender",
                "age_range",
                "min_age",
                "max_age",
                "population",
                "reference_period_start",
                "reference_period_end",
            ],
            Self::OperationalPresence => &[
                "resource_ref",
                "admin2_ref",
                "org_ref",
                "sector_code",
                "reference_period_start",
                "reference_period_end",
            ],
        }
    }

    /// Unique column identifying a row across runs, if any.
    ///
    /// Inserts into keyed tables are idempotent; fact tables have no key.
    pub fn key_column(self) -> Option<&'static str> {
        match self {
            Self::Location | Self::Admin1 | Self::Admin2 | Self::OrgType | Self::Sector => {
                Some("code")
            }
            Self::Org => Some("identity"),
            Self::Dataset | Self::Resource => Some("hdx_id"),
            Self::Population | Self::OperationalPresence => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_columns_are_written_columns() {
        for table in Table::ALL {
            if let Some(key) = table.key_column() {
                assert!(table.columns().contains(&key), "{table}");
            }
        }
    }
}
