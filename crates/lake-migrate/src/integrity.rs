//! Post-hoc integrity validation of a migrated table.
//!
//! Independent of the executor's own bookkeeping: both tables are read
//! fresh from their catalogs and compared check by check. A failed
//! structural check (row count, column count, column names, data types)
//! fails the report; a checksum-only mismatch downgrades to a warning,
//! since destination storage may legitimately re-encode values.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::checksum::ChecksumComputer;
use crate::core::{Dataset, TableRef};
use crate::error::Result;

/// Number of leading rows compared by the sample-data check.
const SAMPLE_ROWS: usize = 100;

/// Overall outcome of an integrity validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Every check passed.
    Passed,
    /// Only the checksum check failed.
    Warning,
    /// A structural check failed.
    Failed,
    /// A table could not be read; see `message`.
    Error,
}

/// Result of one named check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name (e.g., "row_count").
    pub name: String,

    /// Whether the check passed.
    pub passed: bool,

    /// Check-specific details.
    pub details: serde_json::Value,
}

/// Full validation report for a source/destination table pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Overall status.
    pub status: ValidationStatus,

    /// Individual check results, in execution order.
    pub checks: Vec<CheckResult>,

    /// Error message when `status` is [`ValidationStatus::Error`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationReport {
    /// Look up a check result by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Compares two tables across catalogs after a migration.
pub struct IntegrityValidator {
    source: Arc<dyn Catalog>,
    dest: Arc<dyn Catalog>,
    checksums: ChecksumComputer,
}

impl IntegrityValidator {
    /// Create a validator over a source and destination catalog.
    pub fn new(source: Arc<dyn Catalog>, dest: Arc<dyn Catalog>) -> Self {
        Self {
            source,
            dest,
            checksums: ChecksumComputer::new(),
        }
    }

    /// Validate a migrated table pair.
    ///
    /// Never returns an error: a failure to read either table yields a
    /// report with `status = error` and the captured message.
    pub async fn validate(&self, source_ref: &TableRef, dest_ref: &TableRef) -> ValidationReport {
        match self.run(source_ref, dest_ref).await {
            Ok(report) => report,
            Err(e) => {
                error!("Validation failed: {}", e);
                ValidationReport {
                    status: ValidationStatus::Error,
                    checks: Vec::new(),
                    message: Some(e.to_string()),
                }
            }
        }
    }

    async fn run(&self, source_ref: &TableRef, dest_ref: &TableRef) -> Result<ValidationReport> {
        info!("Validating integrity: {} vs {}", source_ref, dest_ref);

        let source_data = self.source.load_table(source_ref).await?.read().await?;
        let dest_data = self.dest.load_table(dest_ref).await?.read().await?;

        let mut checks = Vec::new();
        let mut status = ValidationStatus::Passed;

        // Structural checks; any failure fails the report.
        let row_count_match = source_data.row_count() == dest_data.row_count();
        checks.push(CheckResult {
            name: "row_count".to_string(),
            passed: row_count_match,
            details: json!({
                "source": source_data.row_count(),
                "destination": dest_data.row_count(),
            }),
        });
        if !row_count_match {
            status = ValidationStatus::Failed;
        }

        let col_count_match = source_data.column_count() == dest_data.column_count();
        checks.push(CheckResult {
            name: "column_count".to_string(),
            passed: col_count_match,
            details: json!({
                "source": source_data.column_count(),
                "destination": dest_data.column_count(),
            }),
        });
        if !col_count_match {
            status = ValidationStatus::Failed;
        }

        let source_cols: BTreeSet<String> = source_data.column_names().into_iter().collect();
        let dest_cols: BTreeSet<String> = dest_data.column_names().into_iter().collect();
        let names_match = source_cols == dest_cols;
        let missing: Vec<&String> = source_cols.difference(&dest_cols).collect();
        let extra: Vec<&String> = dest_cols.difference(&source_cols).collect();
        checks.push(CheckResult {
            name: "column_names".to_string(),
            passed: names_match,
            details: json!({ "missing": missing, "extra": extra }),
        });
        if !names_match {
            status = ValidationStatus::Failed;
        }

        let source_types: Vec<&str> = source_data
            .columns
            .iter()
            .map(|c| c.data_type.as_str())
            .collect();
        let dest_types: Vec<&str> = dest_data
            .columns
            .iter()
            .map(|c| c.data_type.as_str())
            .collect();
        let types_match = source_types == dest_types;
        checks.push(CheckResult {
            name: "data_types".to_string(),
            passed: types_match,
            details: json!({ "source": source_types, "destination": dest_types }),
        });
        if !types_match {
            status = ValidationStatus::Failed;
        }

        // Checksum mismatch alone downgrades to a warning, never a failure.
        let source_checksum = self.checksums.fingerprint(&source_data);
        let dest_checksum = self.checksums.fingerprint(&dest_data);
        let checksum_match = source_checksum == dest_checksum;
        checks.push(CheckResult {
            name: "checksum".to_string(),
            passed: checksum_match,
            details: json!({
                "source": source_checksum.as_str(),
                "destination": dest_checksum.as_str(),
            }),
        });
        if !checksum_match && status == ValidationStatus::Passed {
            status = ValidationStatus::Warning;
        }

        // Sample comparison over a bounded prefix; reported only, does not
        // affect the overall status.
        if !source_data.is_empty() && !dest_data.is_empty() {
            let sample_match = rows_equal(&source_data, &dest_data, SAMPLE_ROWS);
            checks.push(CheckResult {
                name: "sample_data".to_string(),
                passed: sample_match,
                details: json!({
                    "rows_compared": SAMPLE_ROWS.min(source_data.row_count()),
                }),
            });
        }

        Ok(ValidationReport {
            status,
            checks,
            message: None,
        })
    }
}

fn rows_equal(source: &Dataset, dest: &Dataset, limit: usize) -> bool {
    source.head(limit) == dest.head(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::core::{Column, Value};

    fn dataset(rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new(
            vec![Column::new("id", "integer"), Column::new("name", "text")],
            rows,
        )
    }

    async fn catalogs_with(
        source_data: Dataset,
        dest_data: Dataset,
    ) -> (Arc<MemoryCatalog>, Arc<MemoryCatalog>, TableRef, TableRef) {
        let source = Arc::new(MemoryCatalog::new());
        let dest = Arc::new(MemoryCatalog::new());
        let source_ref = TableRef::new("src", "t");
        let dest_ref = TableRef::new("dst", "t");
        source.write(&source_data, &source_ref).await.unwrap();
        dest.write(&dest_data, &dest_ref).await.unwrap();
        (source, dest, source_ref, dest_ref)
    }

    #[tokio::test]
    async fn test_identical_tables_pass() {
        let data = dataset(vec![vec![Value::Int(1), Value::Text("a".into())]]);
        let (source, dest, source_ref, dest_ref) = catalogs_with(data.clone(), data).await;

        let validator = IntegrityValidator::new(source, dest);
        let report = validator.validate(&source_ref, &dest_ref).await;
        assert_eq!(report.status, ValidationStatus::Passed);
        assert!(report.check("checksum").unwrap().passed);
        assert!(report.check("sample_data").unwrap().passed);
    }

    #[tokio::test]
    async fn test_missing_table_is_error_not_panic() {
        let source = Arc::new(MemoryCatalog::new());
        let dest = Arc::new(MemoryCatalog::new());
        let validator = IntegrityValidator::new(source, dest);

        let report = validator
            .validate(&TableRef::new("src", "absent"), &TableRef::new("dst", "absent"))
            .await;
        assert_eq!(report.status, ValidationStatus::Error);
        assert!(report.message.unwrap().contains("not found"));
        assert!(report.checks.is_empty());
    }

    #[tokio::test]
    async fn test_sample_check_skipped_for_empty_tables() {
        let empty = dataset(vec![]);
        let (source, dest, source_ref, dest_ref) = catalogs_with(empty.clone(), empty).await;

        let validator = IntegrityValidator::new(source, dest);
        let report = validator.validate(&source_ref, &dest_ref).await;
        assert_eq!(report.status, ValidationStatus::Passed);
        assert!(report.check("sample_data").is_none());
    }
}
