//! Dataset content fingerprinting.
//!
//! The fingerprint is a SHA-256 digest over a canonical, order-sensitive
//! serialization of the dataset: the column-name header followed by each
//! `(row_index, row)` pair. Including the row index makes the digest
//! sensitive to row order and row identity, not just the multiset of values.
//!
//! Hashing materializes each row's canonical form in memory; there is no
//! streaming or bounded-memory variant.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;

use crate::core::Dataset;
use crate::error::{MigrateError, Result};

/// Sentinel digest used when a fingerprint could not be computed.
const UNAVAILABLE: &str = "unavailable";

/// An opaque, equality-only content digest of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumValue(String);

impl ChecksumValue {
    /// The sentinel value returned when fingerprinting fails.
    pub fn unavailable() -> Self {
        Self(UNAVAILABLE.to_string())
    }

    /// Whether this is the unavailable sentinel rather than a real digest.
    pub fn is_unavailable(&self) -> bool {
        self.0 == UNAVAILABLE
    }

    /// Hex digest (or the sentinel) as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChecksumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes deterministic content fingerprints of datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumComputer;

impl ChecksumComputer {
    /// Create a new computer.
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint a dataset.
    ///
    /// Never fails: a serialization error is logged and collapsed into the
    /// [`ChecksumValue::unavailable`] sentinel, since checksum availability
    /// is non-fatal to migration callers.
    pub fn fingerprint(&self, dataset: &Dataset) -> ChecksumValue {
        match self.try_fingerprint(dataset) {
            Ok(value) => value,
            Err(e) => {
                error!("Error calculating checksum: {}", e);
                ChecksumValue::unavailable()
            }
        }
    }

    fn try_fingerprint(&self, dataset: &Dataset) -> Result<ChecksumValue> {
        let mut hasher = Sha256::new();

        let header = serde_json::to_vec(&dataset.column_names())
            .map_err(|e| MigrateError::ChecksumUnavailable(e.to_string()))?;
        hasher.update(&header);

        for (index, row) in dataset.rows.iter().enumerate() {
            let encoded = serde_json::to_vec(&(index, row))
                .map_err(|e| MigrateError::ChecksumUnavailable(e.to_string()))?;
            hasher.update(&encoded);
        }

        Ok(ChecksumValue(hex::encode(hasher.finalize())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, Value};

    fn dataset(rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new(
            vec![Column::new("id", "integer"), Column::new("name", "text")],
            rows,
        )
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let ds = dataset(vec![
            vec![Value::Int(1), Value::Text("a".into())],
            vec![Value::Int(2), Value::Text("b".into())],
        ]);
        let computer = ChecksumComputer::new();
        assert_eq!(computer.fingerprint(&ds), computer.fingerprint(&ds));
        assert!(!computer.fingerprint(&ds).is_unavailable());
    }

    #[test]
    fn test_fingerprint_changes_on_value_change() {
        let computer = ChecksumComputer::new();
        let a = dataset(vec![vec![Value::Int(1), Value::Text("a".into())]]);
        let b = dataset(vec![vec![Value::Int(1), Value::Text("b".into())]]);
        assert_ne!(computer.fingerprint(&a), computer.fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_changes_on_row_reorder() {
        let computer = ChecksumComputer::new();
        let r1 = vec![Value::Int(1), Value::Text("a".into())];
        let r2 = vec![Value::Int(2), Value::Text("b".into())];
        let forward = dataset(vec![r1.clone(), r2.clone()]);
        let reversed = dataset(vec![r2, r1]);
        assert_ne!(computer.fingerprint(&forward), computer.fingerprint(&reversed));
    }

    #[test]
    fn test_identical_copies_match() {
        let computer = ChecksumComputer::new();
        let a = dataset(vec![vec![Value::Int(7), Value::Text("x".into())]]);
        let b = a.clone();
        assert_eq!(computer.fingerprint(&a), computer.fingerprint(&b));
    }

    #[test]
    fn test_unavailable_sentinel() {
        let sentinel = ChecksumValue::unavailable();
        assert!(sentinel.is_unavailable());
        assert_eq!(sentinel, ChecksumValue::unavailable());
        assert_eq!(sentinel.as_str(), "unavailable");
    }
}
