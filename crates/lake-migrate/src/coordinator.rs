//! Bounded-parallel bulk migration.
//!
//! Runs independent [`MigrationExecutor::migrate`] calls under a fixed-size
//! worker pool. The cap is static: there is no adaptive backpressure, and a
//! hung collaborator call occupies its worker slot until it returns.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::core::TableRef;
use crate::error::{MigrateError, Result};
use crate::executor::{MigrateOptions, MigrationExecutor, MigrationRecord, MigrationStatus};

/// Default number of concurrent migration workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Coordinates many single-table migrations under a bounded worker pool.
pub struct ParallelMigrationCoordinator {
    executor: Arc<MigrationExecutor>,
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl ParallelMigrationCoordinator {
    /// Create a coordinator with an explicit worker count.
    ///
    /// Fails with a configuration error when `workers` is zero; this is the
    /// only error surface, raised before any migration work begins.
    pub fn new(executor: Arc<MigrationExecutor>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(MigrateError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            executor,
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        })
    }

    /// Create a coordinator with the default worker count.
    pub fn with_default_workers(executor: Arc<MigrationExecutor>) -> Self {
        Self {
            executor,
            semaphore: Arc::new(Semaphore::new(DEFAULT_WORKERS)),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Migrate many table pairs concurrently.
    ///
    /// Returns exactly one record per input pair, gathered as tasks
    /// complete; result order carries no guarantee relative to the input.
    /// Tasks are fault-isolated: one failure never cancels another, and a
    /// task that dies at the scheduling level (panic) is converted into a
    /// synthesized failed record so no requested unit of work disappears.
    pub async fn migrate_bulk(
        &self,
        pairs: Vec<(TableRef, TableRef)>,
        opts: &MigrateOptions,
    ) -> Vec<MigrationRecord> {
        info!(
            "Migrating {} tables with {} workers",
            pairs.len(),
            self.workers
        );

        let mut pending = FuturesUnordered::new();

        for (source, dest) in pairs {
            let executor = Arc::clone(&self.executor);
            let semaphore = Arc::clone(&self.semaphore);
            let opts = opts.clone();
            let pair = (source.clone(), dest.clone());

            let handle = tokio::spawn(async move {
                // The semaphore lives as long as the coordinator and is
                // never closed, so acquisition only waits for a free slot.
                let _permit = semaphore.acquire_owned().await;
                executor.migrate(&source, &dest, &opts).await
            });

            pending.push(async move { (pair, handle.await) });
        }

        let mut results = Vec::new();
        while let Some(((source, dest), joined)) = pending.next().await {
            match joined {
                Ok(record) => {
                    if record.status == MigrationStatus::Failed {
                        error!(
                            "{} -> {}: failed - {}",
                            source,
                            dest,
                            record.error.as_deref().unwrap_or("unknown error")
                        );
                    } else {
                        info!("{} -> {}: completed ({} rows)", source, dest, record.rows_migrated);
                    }
                    results.push(record);
                }
                Err(e) => {
                    error!("{} -> {}: task panicked - {}", source, dest, e);
                    let err = MigrateError::Infrastructure(format!("Task panicked: {}", e));
                    results.push(self.executor.record_infrastructure_failure(
                        &source,
                        &dest,
                        err.to_string(),
                    ));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::ledger::MigrationLedger;

    fn executor() -> Arc<MigrationExecutor> {
        let source = Arc::new(MemoryCatalog::new());
        let dest = Arc::new(MemoryCatalog::new());
        Arc::new(MigrationExecutor::new(
            source,
            dest,
            Arc::new(MigrationLedger::new()),
        ))
    }

    #[test]
    fn test_zero_workers_is_a_config_error() {
        let err = ParallelMigrationCoordinator::new(executor(), 0)
            .err()
            .expect("zero workers must be rejected");
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_default_worker_count() {
        let coordinator = ParallelMigrationCoordinator::with_default_workers(executor());
        assert_eq!(coordinator.workers(), DEFAULT_WORKERS);
    }
}
