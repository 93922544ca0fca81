//! Mapping between model types and warehouse rows.

use hapi_map::org_identity;
use hapi_model::{
    Admin1, Admin2, Dataset, Location, OperationalPresenceRow, Org, OrgType, PopulationRow,
    Resource, Sector,
};

use crate::error::Result;
use crate::table::Table;
use crate::value::{Fields, Value};

/// A model type stored as one row of [`Record::TABLE`].
///
/// `values` and `from_fields` follow [`Table::columns`] order.
pub trait Record: Sized {
    const TABLE: Table;

    fn values(&self) -> Vec<Value>;

    fn from_fields(fields: &mut Fields) -> Result<Self>;

    /// Value of the table's natural key column.
    fn key(&self) -> Option<String>;
}

impl Record for Location {
    const TABLE: Table = Table::Location;

    fn values(&self) -> Vec<Value> {
        vec![
            (&self.code).into(),
            (&self.name).into(),
            self.reference_period_start.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            code: fields.text()?,
            name: fields.text()?,
            reference_period_start: fields.date()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

impl Record for Admin1 {
    const TABLE: Table = Table::Admin1;

    fn values(&self) -> Vec<Value> {
        vec![
            self.location_ref.into(),
            (&self.code).into(),
            (&self.name).into(),
            self.is_unspecified.into(),
            self.reference_period_start.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            location_ref: fields.int()?,
            code: fields.text()?,
            name: fields.text()?,
            is_unspecified: fields.bool()?,
            reference_period_start: fields.date()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

impl Record for Admin2 {
    const TABLE: Table = Table::Admin2;

    fn values(&self) -> Vec<Value> {
        vec![
            self.admin1_ref.into(),
            (&self.code).into(),
            (&self.name).into(),
            self.is_unspecified.into(),
            self.reference_period_start.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            admin1_ref: fields.int()?,
            code: fields.text()?,
            name: fields.text()?,
            is_unspecified: fields.bool()?,
            reference_period_start: fields.date()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

impl Record for OrgType {
    const TABLE: Table = Table::OrgType;

    fn values(&self) -> Vec<Value> {
        vec![(&self.code).into(), (&self.description).into()]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            code: fields.text()?,
            description: fields.text()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

impl Record for Sector {
    const TABLE: Table = Table::Sector;

    fn values(&self) -> Vec<Value> {
        vec![(&self.code).into(), (&self.name).into()]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            code: fields.text()?,
            name: fields.text()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.code.clone())
    }
}

impl Record for Org {
    const TABLE: Table = Table::Org;

    fn values(&self) -> Vec<Value> {
        vec![
            org_identity(&self.acronym, &self.name).into(),
            (&self.acronym).into(),
            (&self.name).into(),
            self.org_type_code.as_ref().into(),
            self.reference_period_start.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let _identity = fields.text()?;
        Ok(Self {
            acronym: fields.text()?,
            name: fields.text()?,
            org_type_code: fields.opt_text()?,
            reference_period_start: fields.date()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(org_identity(&self.acronym, &self.name))
    }
}

impl Record for Dataset {
    const TABLE: Table = Table::Dataset;

    fn values(&self) -> Vec<Value> {
        vec![
            (&self.hdx_id).into(),
            (&self.hdx_stub).into(),
            (&self.title).into(),
            (&self.hdx_provider_stub).into(),
            (&self.hdx_provider_name).into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            hdx_id: fields.text()?,
            hdx_stub: fields.text()?,
            title: fields.text()?,
            hdx_provider_stub: fields.text()?,
            hdx_provider_name: fields.text()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.hdx_id.clone())
    }
}

impl Record for Resource {
    const TABLE: Table = Table::Resource;

    fn values(&self) -> Vec<Value> {
        vec![
            self.dataset_ref.into(),
            (&self.hdx_id).into(),
            (&self.name).into(),
            (&self.format).into(),
            self.update_date.into(),
            self.is_hxl.into(),
            (&self.download_url).into(),
            self.content_sha256.as_ref().into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            dataset_ref: fields.int()?,
            hdx_id: fields.text()?,
            name: fields.text()?,
            format: fields.text()?,
            update_date: fields.date()?,
            is_hxl: fields.bool()?,
            download_url: fields.text()?,
            content_sha256: fields.opt_text()?,
        })
    }

    fn key(&self) -> Option<String> {
        Some(self.hdx_id.clone())
    }
}

impl Record for PopulationRow {
    const TABLE: Table = Table::Population;

    fn values(&self) -> Vec<Value> {
        vec![
            self.resource_ref.into(),
            self.admin2_ref.into(),
            (&self.gender).into(),
            (&self.age_range).into(),
            self.min_age.into(),
            self.max_age.into(),
            self.population.into(),
            self.reference_period_start.into(),
            self.reference_period_end.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            resource_ref: fields.int()?,
            admin2_ref: fields.int()?,
            gender: fields.text()?,
            age_range: fields.text()?,
            min_age: fields.opt_int()?,
            max_age: fields.opt_int()?,
            population: fields.int()?,
            reference_period_start: fields.date()?,
            reference_period_end: fields.opt_date()?,
        })
    }

    fn key(&self) -> Option<String> {
        None
    }
}

impl Record for OperationalPresenceRow {
    const TABLE: Table = Table::OperationalPresence;

    fn values(&self) -> Vec<Value> {
        vec![
            self.resource_ref.into(),
            self.admin2_ref.into(),
            self.org_ref.into(),
            (&self.sector_code).into(),
            self.reference_period_start.into(),
            self.reference_period_end.into(),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self {
            resource_ref: fields.int()?,
            admin2_ref: fields.int()?,
            org_ref: fields.int()?,
            sector_code: fields.text()?,
            reference_period_start: fields.date()?,
            reference_period_end: fields.opt_date()?,
        })
    }

    fn key(&self) -> Option<String> {
        None
    }
}
