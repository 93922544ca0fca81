#![deny(unsafe_code)]

//! Reconciliation engine.
//!
//! Builds the admin hierarchy for the tracked countries, reconciles
//! organisations, sectors and organisation types against reference tables,
//! records dataset provenance and drives the theme populators that write
//! fact rows. [`Pipelines`] runs all of it in dependency order over any
//! [`hapi_db::Session`].

pub mod admins;
pub mod error;
pub mod locations;
pub mod messages;
pub mod metadata;
pub mod org;
pub mod org_type;
pub mod pipeline;
pub mod sector;
pub mod themes;

pub use admins::{AdminHierarchy, AdminNode, BuildStats};
pub use error::{AdminLookupError, CoreError, MetadataError, Result};
pub use locations::{LocationRef, Locations};
pub use messages::{MAX_LISTED_VALUES, Messages, RunMessages};
pub use metadata::Metadata;
pub use org::{MAX_ACRONYM_CHARS, OrgInfo, OrgMatch, OrgResolver, org_reference_date};
pub use org_type::{EXTRA_ORG_TYPES, OrgTypeResolver};
pub use pipeline::{Pipelines, RunSummary, ThemeOutcome, ThemeStatus};
pub use sector::{EXTRA_SECTORS, SectorResolver};
pub use themes::{
    OperationalPresencePopulator, Populator, PopulationPopulator, ThemeContext, ThemeReport,
};
