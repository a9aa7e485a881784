//! Table identity, schema descriptors, and snapshot metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a table within a catalog namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Namespace (database/schema) the table lives in.
    pub namespace: String,

    /// Table name within the namespace.
    pub table: String,
}

impl TableRef {
    /// Create a new table reference.
    pub fn new(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
        }
    }

    /// Get the fully qualified table name.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.table)
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.table)
    }
}

/// Ordered list of column names describing a table's schema.
///
/// Column types are deliberately not part of the descriptor: schema
/// compatibility in this engine is defined on name sets only (see
/// [`crate::validate::SchemaValidator`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Column names in table order.
    pub columns: Vec<String>,
}

impl SchemaDescriptor {
    /// Create a descriptor from column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Whether the descriptor has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SchemaDescriptor {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry in a table's snapshot history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Snapshot identifier assigned at commit time.
    pub snapshot_id: i64,

    /// When the snapshot was committed.
    pub timestamp: DateTime<Utc>,

    /// Commit operation (e.g., "append").
    pub operation: String,
}

/// Aggregate statistics about a table, assembled from its handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatistics {
    /// The table the statistics describe.
    pub table: TableRef,

    /// Column names from the current schema.
    pub columns: Vec<String>,

    /// Current row count.
    pub row_count: usize,

    /// Number of snapshots in the table history.
    pub snapshot_count: usize,

    /// Identifier of the most recent snapshot, if any.
    pub current_snapshot_id: Option<i64>,
}
