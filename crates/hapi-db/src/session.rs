use std::collections::BTreeMap;

use hapi_model::RowId;

use crate::error::Result;
use crate::record::Record;
use crate::table::Table;

/// Write access to the warehouse for a single-writer run.
///
/// Writes are buffered in an open transaction until [`Session::commit`].
/// Inserting a record whose natural key already exists is a no-op, so
/// reference tables can be repopulated against the same database.
pub trait Session {
    /// Insert one record and return its id (the existing id on a key hit).
    fn add<R: Record>(&mut self, record: &R) -> Result<RowId>;

    /// Insert many records, returning how many rows were new.
    fn insert_batch<R: Record>(&mut self, records: &[R]) -> Result<usize>;

    fn commit(&mut self) -> Result<()>;

    /// Discard everything written since the last commit.
    fn rollback(&mut self) -> Result<()>;

    /// Natural key to id for every row of `table`.
    fn ids_by_key(&self, table: Table) -> Result<BTreeMap<String, RowId>>;

    fn id_for(&self, table: Table, key: &str) -> Result<Option<RowId>>;

    fn exists(&self, table: Table, key: &str) -> Result<bool> {
        Ok(self.id_for(table, key)?.is_some())
    }

    /// Every row of `R`'s table with its id, in id order.
    fn load<R: Record>(&self) -> Result<Vec<(RowId, R)>>;

    fn count(&self, table: Table) -> Result<usize>;
}
