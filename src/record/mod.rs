//! Schema-tagged rows.
//!
//! A [`Record`] carries the name of the table it belongs to, the column types
//! reported by the catalog and the values of one row. Templates (records with
//! no values) describe the shape of a table; live records come back from the
//! store and are owned by whoever asked for them.

mod value;

pub use value::{ColumnKind, Value};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the column treated as the row identity in every table.
pub const IDENTITY_COLUMN: &str = "id";

/// Column name to database type name, e.g. `"id" -> "integer"`.
pub type Schema = BTreeMap<String, String>;

/// Column name to value for a single row.
pub type Fields = BTreeMap<String, Value>;

/// Anything that behaves like a row of some table.
pub trait RowLike {
    fn identity(&self) -> Option<&Value>;
    fn table_of(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    table_name: String,
    schema: Schema,
    fields: Fields,
}

impl Record {
    /// Creates an empty record describing the shape of `table_name`.
    pub fn template(table_name: impl Into<String>, schema: Schema) -> Record {
        Record {
            table_name: table_name.into(),
            schema,
            fields: Fields::new(),
        }
    }

    /// Copies this record's table and schema with the given values.
    ///
    /// Fails if a value names a column the schema does not have.
    pub fn with_fields(&self, fields: Fields) -> Result<Record> {
        let mut record = Record::template(self.table_name.clone(), self.schema.clone());
        for (column, value) in fields {
            record.set(column, value)?;
        }
        Ok(record)
    }

    /// Builds a record from values decoded by the store, which only ever
    /// selects schema columns.
    pub(crate) fn from_parts(table_name: &str, schema: &Schema, fields: Fields) -> Record {
        Record {
            table_name: table_name.to_string(),
            schema: schema.clone(),
            fields,
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let column = column.into();
        if !self.schema.contains_key(&column) {
            return Err(Error::Validation(format!(
                "table {} has no column {}",
                self.table_name, column
            )));
        }
        self.fields.insert(column, value.into());
        Ok(())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.schema.get(column).map(String::as_str)
    }

    pub fn has_identity_column(&self) -> bool {
        self.schema.contains_key(IDENTITY_COLUMN)
    }

    pub fn is_template(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in display order: the identity column first, then the
    /// rest alphabetically.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.schema.keys().map(String::as_str).collect();
        columns.sort_by_key(|c| (*c != IDENTITY_COLUMN, *c));
        columns
    }
}

impl RowLike for Record {
    fn identity(&self) -> Option<&Value> {
        self.fields.get(IDENTITY_COLUMN)
    }

    fn table_of(&self) -> &str {
        &self.table_name
    }
}
