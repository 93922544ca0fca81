#![deny(unsafe_code)]

//! Warehouse persistence.
//!
//! [`Session`] is the only interface the pipeline writes through;
//! [`Warehouse`] implements it over SQLite with foreign keys enforced.

mod error;
mod record;
mod schema;
mod session;
mod table;
mod value;
mod warehouse;

pub use error::{DbError, Result};
pub use record::Record;
pub use schema::SQLITE_SCHEMA_VERSION;
pub use session::Session;
pub use table::Table;
pub use value::{Fields, Value};
pub use warehouse::Warehouse;
