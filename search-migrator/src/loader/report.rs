//! Load run report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use search_migrator_shared::DocumentError;

use crate::errors::MigrationError;

/// Summary of one load run.
///
/// A run with failed documents still completes; the failures are listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub run_id: Uuid,
    pub index_name: String,
    pub doc_type: String,
    /// Documents found in the data directory.
    pub total: usize,
    /// Documents sent to the registry.
    pub submitted: usize,
    /// Bulk requests issued.
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Occurrences per error type.
    pub error_counts: BTreeMap<String, usize>,
    pub errors: Vec<DocumentError>,
}

impl LoadReport {
    /// Start a report for a run against `index_name`.
    pub fn new(index_name: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            index_name: index_name.into(),
            doc_type: doc_type.into(),
            total: 0,
            submitted: 0,
            batches: 0,
            started_at: Utc::now(),
            finished_at: None,
            error_counts: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Record failed documents.
    pub fn record_errors(&mut self, errors: impl IntoIterator<Item = DocumentError>) {
        for error in errors {
            *self.error_counts.entry(error.error_type.clone()).or_insert(0) += 1;
            self.errors.push(error);
        }
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Write the report as pretty JSON to `<dir>/load-report-<run_id>.json`.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, MigrationError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| MigrationError::io(format!("creating {}: {}", dir.display(), e)))?;

        let path = dir.join(format!("load-report-{}.json", self.run_id));
        let body = serde_json::to_vec_pretty(self)
            .map_err(|e| MigrationError::io(format!("serializing load report: {}", e)))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| MigrationError::io(format!("writing {}: {}", path.display(), e)))?;
        Ok(path)
    }
}
