//! Result rows returned by a store.

use crate::error::Error;
use crate::value::Value;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One named column value within a projected row.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct ColumnValue {
    /// Column alias from the projection.
    pub name: String,
    /// Column value.
    pub value: Value,
}

/// A joined row after projection, columns in projection order.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct ProjectedRow {
    /// Column values.
    pub columns: Vec<ColumnValue>,
}

impl ProjectedRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self { columns: vec![] }
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push(ColumnValue {
            name: name.into(),
            value,
        });
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.value)
    }

    /// Remove and return a column value by name.
    pub fn take(&mut self, name: &str) -> Result<Value, Error> {
        let index = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        Ok(self.columns.remove(index).value)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
