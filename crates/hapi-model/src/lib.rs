#![deny(unsafe_code)]

pub mod admin;
pub mod entity;
pub mod error;
pub mod fact;
pub mod provenance;

pub use admin::{
    AdminLevel, CONNECTOR_SUFFIX, Granularity, UNSPECIFIED_NAME, admin1_connector_code,
    admin2_connector_code, resolve_admin2,
};
pub use entity::{Admin1, Admin2, Location, Org, OrgType, RowId, Sector};
pub use error::{ModelError, Result};
pub use fact::{OperationalPresenceRow, PopulationRow};
pub use provenance::{Dataset, DatasetDescriptor, Resource, ResourceDescriptor};
