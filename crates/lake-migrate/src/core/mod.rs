//! Core data model: table identity, schema descriptors, and in-memory
//! datasets shared across the migration engine.

pub mod dataset;
pub mod table;
pub mod value;

pub use dataset::{Column, Dataset, Row};
pub use table::{SchemaDescriptor, SnapshotEntry, TableRef, TableStatistics};
pub use value::Value;
