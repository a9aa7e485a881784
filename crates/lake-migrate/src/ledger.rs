//! Append-only migration ledger and reporting.
//!
//! The ledger is the only state shared between parallel migration workers.
//! Appends are serialized behind a mutex; records are immutable once
//! appended and ledger order reflects append order.

use std::path::Path;
use std::sync::Mutex;

use tracing::info;

use crate::error::Result;
use crate::executor::{MigrationRecord, MigrationStatus};

/// Append-only ordered store of migration records.
#[derive(Debug, Default)]
pub struct MigrationLedger {
    records: Mutex<Vec<MigrationRecord>>,
}

impl MigrationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized record. Safe under concurrent calls.
    pub fn append(&self, record: MigrationRecord) {
        self.guard().push(record);
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<MigrationRecord> {
        self.guard().clone()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<MigrationRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Generate a plain-text aggregate report over all records.
    pub fn generate_report(&self) -> String {
        use std::fmt::Write;

        let records = self.records();

        let total = records.len();
        let successful = records
            .iter()
            .filter(|r| r.status == MigrationStatus::Success)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.status == MigrationStatus::Failed)
            .count();
        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let total_rows: usize = records.iter().map(|r| r.rows_migrated).sum();
        let total_duration: f64 = records.iter().map(|r| r.duration_seconds).sum();
        let throughput = if total_duration > 0.0 {
            total_rows as f64 / total_duration
        } else {
            0.0
        };

        let mut report = String::new();
        let bar = "=".repeat(80);
        let rule = "-".repeat(80);

        let _ = writeln!(report, "{}", bar);
        let _ = writeln!(report, "DATA LAKE MIGRATION REPORT");
        let _ = writeln!(report, "{}", bar);
        let _ = writeln!(report);
        let _ = writeln!(report, "Total Migrations: {}", total);
        let _ = writeln!(report, "Successful: {}", successful);
        let _ = writeln!(report, "Failed: {}", failed);
        let _ = writeln!(report, "Success Rate: {:.2}%", success_rate);
        let _ = writeln!(report);
        let _ = writeln!(report, "Total Rows Migrated: {}", total_rows);
        let _ = writeln!(report, "Total Duration: {:.2} seconds", total_duration);
        let _ = writeln!(report, "Average Throughput: {:.0} rows/sec", throughput);
        let _ = writeln!(report);
        let _ = writeln!(report, "{}", rule);
        let _ = writeln!(report, "MIGRATION DETAILS");
        let _ = writeln!(report, "{}", rule);
        let _ = writeln!(report);

        for record in &records {
            let _ = writeln!(report, "Migration ID: {}", record.migration_id);
            let _ = writeln!(report, "Source: {}", record.source);
            let _ = writeln!(report, "Destination: {}", record.destination);
            let _ = writeln!(report, "Status: {}", record.status);
            let _ = writeln!(report, "Rows: {}", record.rows_migrated);
            let _ = writeln!(report, "Duration: {:.3} sec", record.duration_seconds);
            let _ = writeln!(report, "Checksum Match: {}", record.checksum_match);
            if let Some(error) = &record.error {
                let _ = writeln!(report, "Error: {}", error);
            }
            let _ = writeln!(report);
        }

        report
    }

    /// Export the full ledger as a pretty-printed JSON array.
    ///
    /// The write is atomic: content goes to a temp file that is renamed over
    /// the target path.
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.records())?;

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, path)?;

        info!("Migration ledger exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TableRef;
    use chrono::Utc;
    use std::sync::Arc;

    fn record(id: &str, status: MigrationStatus, rows: usize, duration: f64) -> MigrationRecord {
        MigrationRecord {
            migration_id: id.to_string(),
            source: TableRef::new("src", "t"),
            destination: TableRef::new("dst", "t"),
            status,
            rows_migrated: rows,
            rows_verified: rows,
            source_checksum: None,
            dest_checksum: None,
            checksum_match: status == MigrationStatus::Success,
            duration_seconds: duration,
            timestamp: Utc::now(),
            error: (status == MigrationStatus::Failed).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let ledger = MigrationLedger::new();
        ledger.append(record("m1", MigrationStatus::Success, 10, 0.5));
        ledger.append(record("m2", MigrationStatus::Failed, 0, 0.1));

        let records = ledger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].migration_id, "m1");
        assert_eq!(records[1].migration_id, "m2");
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let ledger = Arc::new(MigrationLedger::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    ledger.append(record(
                        &format!("m{}-{}", t, i),
                        MigrationStatus::Success,
                        1,
                        0.01,
                    ));
                }
            }));
        }
        for handle in handles {
            handle.join().expect("appender thread panicked");
        }

        assert_eq!(ledger.len(), 400);
    }

    #[test]
    fn test_report_aggregates() {
        let ledger = MigrationLedger::new();
        ledger.append(record("m1", MigrationStatus::Success, 100, 1.0));
        ledger.append(record("m2", MigrationStatus::Success, 300, 1.0));
        ledger.append(record("m3", MigrationStatus::Failed, 0, 0.5));

        let report = ledger.generate_report();
        assert!(report.contains("Total Migrations: 3"));
        assert!(report.contains("Successful: 2"));
        assert!(report.contains("Failed: 1"));
        assert!(report.contains("Success Rate: 66.67%"));
        assert!(report.contains("Total Rows Migrated: 400"));
        assert!(report.contains("Error: boom"));
    }

    #[test]
    fn test_report_on_empty_ledger_guards_division() {
        let ledger = MigrationLedger::new();
        let report = ledger.generate_report();
        assert!(report.contains("Success Rate: 0.00%"));
        assert!(report.contains("Average Throughput: 0 rows/sec"));
    }

    #[test]
    fn test_export_json_round_trip() {
        let ledger = MigrationLedger::new();
        ledger.append(record("m1", MigrationStatus::Success, 10, 0.5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        ledger.export_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<MigrationRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].migration_id, "m1");
        assert_eq!(parsed[0].status, MigrationStatus::Success);
    }
}
