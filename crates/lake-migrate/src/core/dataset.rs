//! In-memory tabular datasets.
//!
//! A [`Dataset`] is the transient representation of a table's contents while
//! a migration is in flight. It is fully materialized: the engine reads whole
//! tables into memory and writes them back out in one commit. Streaming or
//! chunked transfer is a known scalability gap, not provided here.

use serde::{Deserialize, Serialize};

use super::table::SchemaDescriptor;
use super::value::Value;

/// A single row of cell values, in column order.
pub type Row = Vec<Value>;

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Logical type name (e.g., "integer", "text", "timestamp").
    pub data_type: String,
}

impl Column {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// An ordered sequence of typed rows with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column definitions, in table order.
    pub columns: Vec<Column>,

    /// Row data; each row has one value per column.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset from columns and rows.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Create an empty dataset with the given columns.
    pub fn empty(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Schema descriptor for this dataset.
    pub fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new(self.column_names())
    }

    /// Index of the column with the given name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The first `n` rows (or fewer if the dataset is smaller).
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}
