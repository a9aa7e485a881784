//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Referenced table does not exist in the catalog.
    #[error("Table not found: {0}")]
    NotFound(String),

    /// Source and destination schemas are incompatible.
    #[error("Schema validation failed: {0}")]
    SchemaIncompatible(String),

    /// Reading a table from a catalog failed.
    #[error("Read failed for table {table}: {message}")]
    Read { table: String, message: String },

    /// Writing a dataset to a catalog failed.
    #[error("Write failed for table {table}: {message}")]
    Write { table: String, message: String },

    /// Dataset fingerprint could not be computed (non-fatal to callers;
    /// collapses to the `unavailable` sentinel).
    #[error("Checksum unavailable: {0}")]
    ChecksumUnavailable(String),

    /// Invalid construction or options (raised before any migration work).
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (ledger export, file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure during the pipeline or task scheduling.
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

impl MigrateError {
    /// Create a Read error for a specific table.
    pub fn read(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Read {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Write error for a specific table.
    pub fn write(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Write {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
