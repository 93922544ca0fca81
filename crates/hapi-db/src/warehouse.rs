//! SQLite-backed [`Session`].

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use hapi_model::RowId;

use crate::error::{DbError, Result};
use crate::record::Record;
use crate::schema::{PRAGMAS, SCHEMA, SQLITE_SCHEMA_VERSION};
use crate::session::Session;
use crate::table::Table;
use crate::value::{Fields, Value};

pub struct Warehouse {
    conn: Connection,
    in_transaction: bool,
    pending: usize,
}

impl Warehouse {
    /// Open (creating if needed) the warehouse at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened warehouse");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DbError::Transaction)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(PRAGMAS).map_err(DbError::Transaction)?;
        conn.execute_batch(SCHEMA).map_err(DbError::Transaction)?;
        conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))
            .map_err(DbError::Transaction)?;
        Ok(Self {
            conn,
            in_transaction: false,
            pending: 0,
        })
    }

    /// Rows written since the last commit.
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn begin(&mut self) -> Result<()> {
        if !self.in_transaction {
            self.conn
                .execute_batch("BEGIN")
                .map_err(DbError::Transaction)?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn insert_sql(table: Table) -> String {
        let columns = table.columns();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let verb = if table.key_column().is_some() {
            "INSERT OR IGNORE"
        } else {
            "INSERT"
        };
        format!(
            "{verb} INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders.join(", ")
        )
    }

    fn key_column(table: Table) -> Result<&'static str> {
        table.key_column().ok_or(DbError::NoNaturalKey(table))
    }
}

impl Session for Warehouse {
    fn add<R: Record>(&mut self, record: &R) -> Result<RowId> {
        self.begin()?;
        let table = R::TABLE;
        let values = record.values();
        let changed = {
            let mut stmt = self
                .conn
                .prepare_cached(&Self::insert_sql(table))
                .map_err(DbError::sqlite(table))?;
            stmt.execute(params_from_iter(values.iter()))
                .map_err(DbError::sqlite(table))?
        };

        if changed > 0 {
            self.pending += 1;
            return Ok(self.conn.last_insert_rowid());
        }
        let key = record.key().ok_or(DbError::NoNaturalKey(table))?;
        self.id_for(table, &key)?.ok_or_else(|| DbError::Decode {
            table,
            column: Self::key_column(table).unwrap_or("?"),
            reason: format!("ignored insert left no row for key {key}"),
        })
    }

    fn insert_batch<R: Record>(&mut self, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.begin()?;
        let table = R::TABLE;
        let mut stmt = self
            .conn
            .prepare_cached(&Self::insert_sql(table))
            .map_err(DbError::sqlite(table))?;
        let mut inserted = 0;
        for record in records {
            let values: Vec<Value> = record.values();
            inserted += stmt
                .execute(params_from_iter(values.iter()))
                .map_err(DbError::sqlite(table))?;
        }
        drop(stmt);
        self.pending += inserted;
        Ok(inserted)
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.conn
                .execute_batch("COMMIT")
                .map_err(DbError::Transaction)?;
            self.in_transaction = false;
            debug!(rows = self.pending, "committed");
            self.pending = 0;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.conn
                .execute_batch("ROLLBACK")
                .map_err(DbError::Transaction)?;
            self.in_transaction = false;
            debug!(rows = self.pending, "rolled back");
            self.pending = 0;
        }
        Ok(())
    }

    fn ids_by_key(&self, table: Table) -> Result<BTreeMap<String, RowId>> {
        let key = Self::key_column(table)?;
        let sql = format!("SELECT {key}, id FROM {}", table.name());
        let mut stmt = self.conn.prepare(&sql).map_err(DbError::sqlite(table))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, RowId>(1)?)))
            .map_err(DbError::sqlite(table))?;
        rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()
            .map_err(DbError::sqlite(table))
    }

    fn id_for(&self, table: Table, key: &str) -> Result<Option<RowId>> {
        let column = Self::key_column(table)?;
        let sql = format!("SELECT id FROM {} WHERE {column} = ?1", table.name());
        self.conn
            .query_row(&sql, params![key], |row| row.get::<_, RowId>(0))
            .optional()
            .map_err(DbError::sqlite(table))
    }

    fn load<R: Record>(&self) -> Result<Vec<(RowId, R)>> {
        let table = R::TABLE;
        let columns = table.columns();
        let sql = format!(
            "SELECT id, {} FROM {} ORDER BY id",
            columns.join(", "),
            table.name()
        );
        let mut stmt = self.conn.prepare(&sql).map_err(DbError::sqlite(table))?;
        let raw = stmt
            .query_map([], |row| {
                let id = row.get::<_, RowId>(0)?;
                let values = (1..=columns.len())
                    .map(|idx| row.get_ref(idx).map(Value::from_ref))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok((id, values))
            })
            .map_err(DbError::sqlite(table))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DbError::sqlite(table))?;

        raw.into_iter()
            .map(|(id, values)| {
                let mut fields = Fields::new(table, values);
                R::from_fields(&mut fields).map(|record| (id, record))
            })
            .collect()
    }

    fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(DbError::sqlite(table))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_ignores_conflicts_on_keyed_tables() {
        assert_eq!(
            Warehouse::insert_sql(Table::Sector),
            "INSERT OR IGNORE INTO sector (code, name) VALUES (?1, ?2)"
        );
        assert!(Warehouse::insert_sql(Table::Population).starts_with("INSERT INTO population"));
    }
}
