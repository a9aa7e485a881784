//! Schema compatibility validation.
//!
//! Compatibility is defined purely on column-name sets: types and column
//! order are not compared. This is an inherited simplification the rest of
//! the engine depends on; type-aware comparison is an open design question,
//! not implemented here.

use std::collections::BTreeSet;

use crate::core::SchemaDescriptor;

/// Outcome of a schema comparison.
#[derive(Debug, Clone)]
pub struct SchemaComparison {
    /// Whether the schemas are compatible.
    pub compatible: bool,

    /// Human-readable explanation; names the differences on mismatch.
    pub message: String,
}

/// Compares source and destination schemas for migration compatibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Compare a source schema against an optional destination schema.
    ///
    /// An absent or empty destination means the table does not exist yet;
    /// that pair is automatically compatible and the source's column set
    /// becomes the reference. Otherwise the schemas are compatible iff the
    /// two name sets are equal, and the mismatch message reports the
    /// differences both ways.
    pub fn compare(
        &self,
        source: &SchemaDescriptor,
        dest: Option<&SchemaDescriptor>,
    ) -> SchemaComparison {
        let source_cols: BTreeSet<&str> = source.columns.iter().map(String::as_str).collect();

        let dest_cols: BTreeSet<&str> = match dest {
            Some(schema) if !schema.is_empty() => {
                schema.columns.iter().map(String::as_str).collect()
            }
            _ => source_cols.clone(),
        };

        if source_cols != dest_cols {
            let missing: Vec<&str> = source_cols.difference(&dest_cols).copied().collect();
            let extra: Vec<&str> = dest_cols.difference(&source_cols).copied().collect();
            return SchemaComparison {
                compatible: false,
                message: format!(
                    "Schema mismatch. Missing: {:?}, Extra: {:?}",
                    missing, extra
                ),
            };
        }

        SchemaComparison {
            compatible: true,
            message: "Schemas are compatible".to_string(),
        }
    }
}
