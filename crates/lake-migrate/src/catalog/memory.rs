//! In-memory catalog implementation.
//!
//! Backs the test suite and serves as the reference implementation of the
//! [`Catalog`] contract. Tables live in a process-local map; `write` commits
//! append rows (creating the table from the dataset's columns when absent)
//! and record a snapshot entry per commit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::core::{Dataset, SchemaDescriptor, SnapshotEntry, TableRef};
use crate::error::{MigrateError, Result};

use super::{Catalog, TableHandle};

#[derive(Debug, Clone)]
struct StoredTable {
    dataset: Dataset,
    history: Vec<SnapshotEntry>,
}

/// Thread-safe in-memory warehouse keyed by qualified table name.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<String, StoredTable>>,
    next_snapshot_id: AtomicI64,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables currently in the catalog.
    pub fn table_count(&self) -> usize {
        self.read_guard().len()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredTable>> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredTable>> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Point-in-time handle over a table's contents.
///
/// The handle owns a copy taken at `load_table` time: later commits to the
/// catalog are not visible through an already-resolved handle.
struct MemoryTableHandle {
    stored: StoredTable,
}

#[async_trait]
impl TableHandle for MemoryTableHandle {
    async fn read(&self) -> Result<Dataset> {
        Ok(self.stored.dataset.clone())
    }

    async fn schema(&self) -> Result<SchemaDescriptor> {
        Ok(self.stored.dataset.schema())
    }

    async fn history(&self) -> Result<Vec<SnapshotEntry>> {
        Ok(self.stored.history.clone())
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn load_table(&self, table: &TableRef) -> Result<Box<dyn TableHandle>> {
        let guard = self.read_guard();
        let stored = guard
            .get(&table.qualified())
            .ok_or_else(|| MigrateError::NotFound(table.qualified()))?
            .clone();
        Ok(Box::new(MemoryTableHandle { stored }))
    }

    async fn write(&self, dataset: &Dataset, table: &TableRef) -> Result<()> {
        let qualified = table.qualified();
        let snapshot = SnapshotEntry {
            snapshot_id: self.next_snapshot_id.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp: Utc::now(),
            operation: "append".to_string(),
        };

        let mut guard = self.write_guard();
        match guard.get_mut(&qualified) {
            Some(stored) => {
                if stored.dataset.column_names() != dataset.column_names() {
                    return Err(MigrateError::write(
                        qualified,
                        "column set does not match existing table",
                    ));
                }
                stored.dataset.rows.extend(dataset.rows.iter().cloned());
                stored.history.push(snapshot);
            }
            None => {
                debug!("Creating table: {}", qualified);
                guard.insert(
                    qualified,
                    StoredTable {
                        dataset: dataset.clone(),
                        history: vec![snapshot],
                    },
                );
            }
        }
        Ok(())
    }

    async fn table_exists(&self, table: &TableRef) -> Result<bool> {
        Ok(self.read_guard().contains_key(&table.qualified()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, Value};

    fn orders() -> Dataset {
        Dataset::new(
            vec![Column::new("id", "integer"), Column::new("amount", "float")],
            vec![
                vec![Value::Int(1), Value::Float(9.5)],
                vec![Value::Int(2), Value::Float(12.0)],
            ],
        )
    }

    #[tokio::test]
    async fn test_load_missing_table_is_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog
            .load_table(&TableRef::new("sales", "orders"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MigrateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_creates_then_appends() {
        let catalog = MemoryCatalog::new();
        let table = TableRef::new("sales", "orders");

        catalog.write(&orders(), &table).await.unwrap();
        assert!(catalog.table_exists(&table).await.unwrap());

        catalog.write(&orders(), &table).await.unwrap();
        let handle = catalog.load_table(&table).await.unwrap();
        let dataset = handle.read().await.unwrap();
        assert_eq!(dataset.row_count(), 4);

        let history = handle.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].snapshot_id < history[1].snapshot_id);
        assert_eq!(history[0].operation, "append");
    }

    #[tokio::test]
    async fn test_append_with_different_columns_fails() {
        let catalog = MemoryCatalog::new();
        let table = TableRef::new("sales", "orders");
        catalog.write(&orders(), &table).await.unwrap();

        let other = Dataset::new(
            vec![Column::new("id", "integer")],
            vec![vec![Value::Int(3)]],
        );
        let err = catalog.write(&other, &table).await.err().unwrap();
        assert!(matches!(err, MigrateError::Write { .. }));
    }

    #[tokio::test]
    async fn test_handle_is_point_in_time() {
        let catalog = MemoryCatalog::new();
        let table = TableRef::new("sales", "orders");
        catalog.write(&orders(), &table).await.unwrap();

        let handle = catalog.load_table(&table).await.unwrap();
        catalog.write(&orders(), &table).await.unwrap();

        // Handle still sees the snapshot taken at load time.
        assert_eq!(handle.read().await.unwrap().row_count(), 2);
    }

    #[tokio::test]
    async fn test_collect_statistics() {
        let catalog = MemoryCatalog::new();
        let table = TableRef::new("sales", "orders");
        catalog.write(&orders(), &table).await.unwrap();
        catalog.write(&orders(), &table).await.unwrap();

        let stats = super::super::collect_statistics(&catalog, &table)
            .await
            .unwrap();
        assert_eq!(stats.row_count, 4);
        assert_eq!(stats.snapshot_count, 2);
        assert_eq!(stats.columns, vec!["id", "amount"]);
        assert!(stats.current_snapshot_id.is_some());
    }
}
