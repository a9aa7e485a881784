//! # lake-migrate
//!
//! Table migration engine for moving tabular datasets between two
//! catalog-backed namespaces, with:
//!
//! - **Schema validation** on column-name sets before writing
//! - **Checksum verification** via deterministic content fingerprints
//! - **Bounded-parallel bulk execution** with a fixed worker pool
//! - **Checkpointed incremental transfer** on a watermark column
//! - **Auditable result ledger** with text and JSON reporting
//!
//! The engine is invoked as a library by orchestration code holding
//! constructed [`Catalog`] handles; it owns no network protocol and does
//! not implement the table-format storage engine itself.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lake_migrate::{
//!     MemoryCatalog, MigrateOptions, MigrationExecutor, MigrationLedger, TableRef,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(MemoryCatalog::new());
//!     let dest = Arc::new(MemoryCatalog::new());
//!     let ledger = Arc::new(MigrationLedger::new());
//!
//!     let executor = MigrationExecutor::new(source, dest, ledger.clone());
//!     let record = executor
//!         .migrate(
//!             &TableRef::new("sales", "orders"),
//!             &TableRef::new("prod", "orders"),
//!             &MigrateOptions::default(),
//!         )
//!         .await;
//!
//!     println!("Migrated {} rows", record.rows_migrated);
//!     println!("{}", ledger.generate_report());
//! }
//! ```

pub mod catalog;
pub mod checksum;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod executor;
pub mod incremental;
pub mod integrity;
pub mod ledger;
pub mod validate;

// Re-exports for convenient access
pub use catalog::{collect_statistics, Catalog, MemoryCatalog, TableHandle};
pub use checksum::{ChecksumComputer, ChecksumValue};
pub use coordinator::{ParallelMigrationCoordinator, DEFAULT_WORKERS};
pub use self::core::{
    Column, Dataset, Row, SchemaDescriptor, SnapshotEntry, TableRef, TableStatistics, Value,
};
pub use error::{MigrateError, Result};
pub use executor::{MigrateOptions, MigrationExecutor, MigrationRecord, MigrationStatus};
pub use incremental::{IncrementalMigrator, IncrementalResult, WATERMARK_COLUMN};
pub use integrity::{CheckResult, IntegrityValidator, ValidationReport, ValidationStatus};
pub use ledger::MigrationLedger;
pub use validate::{SchemaComparison, SchemaValidator};
