//! Column values exchanged with the warehouse.

use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};

use crate::error::{DbError, Result};
use crate::table::Table;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single column value; dates travel as ISO text, booleans as integers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Text(value.format(DATE_FORMAT).to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Integer(value) => ToSqlOutput::Borrowed(ValueRef::Integer(*value)),
            Self::Real(value) => ToSqlOutput::Borrowed(ValueRef::Real(*value)),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

impl Value {
    pub(crate) fn from_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(value) => Self::Integer(value),
            ValueRef::Real(value) => Self::Real(value),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Self::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Cursor over one stored row, decoding columns in table order.
pub struct Fields {
    table: Table,
    columns: std::slice::Iter<'static, &'static str>,
    values: std::vec::IntoIter<Value>,
}

impl Fields {
    pub fn new(table: Table, values: Vec<Value>) -> Self {
        Self {
            table,
            columns: table.columns().iter(),
            values: values.into_iter(),
        }
    }

    fn next(&mut self) -> Result<(&'static str, Value)> {
        let column = self.columns.next().copied().unwrap_or("?");
        let value = self.values.next().ok_or_else(|| DbError::Decode {
            table: self.table,
            column,
            reason: "missing value".to_string(),
        })?;
        Ok((column, value))
    }

    fn mismatch(&self, column: &'static str, expected: &str, found: &Value) -> DbError {
        DbError::Decode {
            table: self.table,
            column,
            reason: format!("expected {expected}, found {found:?}"),
        }
    }

    pub fn opt_text(&mut self) -> Result<Option<String>> {
        match self.next()? {
            (_, Value::Null) => Ok(None),
            (_, Value::Text(text)) => Ok(Some(text)),
            (column, other) => Err(self.mismatch(column, "text", &other)),
        }
    }

    pub fn text(&mut self) -> Result<String> {
        match self.next()? {
            (_, Value::Text(text)) => Ok(text),
            (column, other) => Err(self.mismatch(column, "text", &other)),
        }
    }

    pub fn opt_int(&mut self) -> Result<Option<i64>> {
        match self.next()? {
            (_, Value::Null) => Ok(None),
            (_, Value::Integer(value)) => Ok(Some(value)),
            (column, other) => Err(self.mismatch(column, "integer", &other)),
        }
    }

    pub fn int(&mut self) -> Result<i64> {
        match self.next()? {
            (_, Value::Integer(value)) => Ok(value),
            (column, other) => Err(self.mismatch(column, "integer", &other)),
        }
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.int().map(|value| value != 0)
    }

    pub fn opt_date(&mut self) -> Result<Option<NaiveDate>> {
        match self.next()? {
            (_, Value::Null) => Ok(None),
            (column, Value::Text(text)) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Some)
                .map_err(|e| DbError::Decode {
                    table: self.table,
                    column,
                    reason: format!("invalid date '{text}': {e}"),
                }),
            (column, other) => Err(self.mismatch(column, "date", &other)),
        }
    }

    pub fn date(&mut self) -> Result<NaiveDate> {
        let column = self.columns.clone().next().copied().unwrap_or("?");
        self.opt_date()?.ok_or_else(|| DbError::Decode {
            table: self.table,
            column,
            reason: "expected date, found NULL".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_in_column_order() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut fields = Fields::new(
            Table::Location,
            vec![Value::from("AFG"), Value::from("Afghanistan"), Value::from(start)],
        );
        assert_eq!(fields.text().unwrap(), "AFG");
        assert_eq!(fields.text().unwrap(), "Afghanistan");
        assert_eq!(fields.date().unwrap(), start);
        assert!(fields.text().is_err());
    }

    #[test]
    fn type_mismatch_names_the_column() {
        let mut fields = Fields::new(Table::Sector, vec![Value::Integer(4)]);
        let err = fields.text().unwrap_err();
        assert_eq!(err.to_string(), "sector.code: expected text, found Integer(4)");
    }

    #[test]
    fn options_and_bools() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }
}
