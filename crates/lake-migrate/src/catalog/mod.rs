//! Catalog collaborator contract.
//!
//! The migration engine is catalog-agnostic: it only needs a collaborator
//! that can resolve a qualified table name to a readable handle, report a
//! schema descriptor and snapshot history, and commit a dataset as a table.
//! Implementations are assumed independently thread-safe for concurrent
//! table access; the engine adds no serialization beyond its worker-pool
//! cap.

pub mod memory;

use async_trait::async_trait;

use crate::core::{Dataset, SchemaDescriptor, SnapshotEntry, TableRef, TableStatistics};
use crate::error::{MigrateError, Result};

pub use memory::MemoryCatalog;

/// A resolved, readable table handle.
#[async_trait]
pub trait TableHandle: Send + Sync {
    /// Read the table's full contents into memory.
    async fn read(&self) -> Result<Dataset>;

    /// Current schema descriptor (column-name list).
    async fn schema(&self) -> Result<SchemaDescriptor>;

    /// Ordered snapshot history, oldest first.
    async fn history(&self) -> Result<Vec<SnapshotEntry>>;
}

/// A catalog-backed namespace that can resolve and commit tables.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a table reference to a readable handle.
    ///
    /// Fails with [`MigrateError::NotFound`] if the table does not exist.
    async fn load_table(&self, table: &TableRef) -> Result<Box<dyn TableHandle>>;

    /// Commit a dataset to a table, creating the table if absent.
    async fn write(&self, dataset: &Dataset, table: &TableRef) -> Result<()>;

    /// Check whether a table exists.
    async fn table_exists(&self, table: &TableRef) -> Result<bool>;
}

/// Assemble aggregate statistics for a table from its handle.
pub async fn collect_statistics(
    catalog: &dyn Catalog,
    table: &TableRef,
) -> Result<TableStatistics> {
    let handle = catalog.load_table(table).await?;

    let schema = handle.schema().await?;
    let history = handle.history().await?;
    let dataset = handle
        .read()
        .await
        .map_err(|e| MigrateError::read(table.qualified(), e.to_string()))?;

    Ok(TableStatistics {
        table: table.clone(),
        columns: schema.columns,
        row_count: dataset.row_count(),
        snapshot_count: history.len(),
        current_snapshot_id: history.last().map(|s| s.snapshot_id),
    })
}
