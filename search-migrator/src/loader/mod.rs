//! Loader module for the search migrator.
//!
//! Bulk loads a directory of JSON documents into a versioned index. Each file
//! is one document whose id is the file name without `.json`. Per-document
//! failures are collected into a [`LoadReport`] and never stop the run.

mod report;

pub use report::LoadReport;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use search_migrator_repository::IndexRegistry;
use search_migrator_shared::{Batch, DocumentError};

use crate::errors::MigrationError;

/// Documents per bulk request unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Extension of document files.
const DOCUMENT_EXTENSION: &str = ".json";

/// Error type recorded when a document file cannot be read or parsed.
const INVALID_DOCUMENT: &str = "invalid_document";

/// Error type recorded for every document of a failed bulk request.
const BULK_REQUEST_FAILED: &str = "bulk_request_failed";

/// Configuration for the batch loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per bulk request.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Loader that submits documents in fixed-size chunks.
pub struct BatchLoader {
    registry: Arc<dyn IndexRegistry>,
    config: LoaderConfig,
}

impl BatchLoader {
    /// Create a new batch loader with the default batch size.
    pub fn new(registry: Arc<dyn IndexRegistry>) -> Self {
        Self::with_config(registry, LoaderConfig::default())
    }

    /// Create a new batch loader with custom configuration.
    pub fn with_config(registry: Arc<dyn IndexRegistry>, config: LoaderConfig) -> Self {
        Self { registry, config }
    }

    /// Load every document in `data_dir` into `index_name`.
    ///
    /// Chunks are submitted one after another. A failed bulk request is
    /// recorded against each document of its chunk and the next chunk is still
    /// sent.
    ///
    /// # Returns
    ///
    /// * `Ok(LoadReport)` - The run completed, possibly with failed documents
    /// * `Err(MigrationError::NotFound)` - If `data_dir` does not exist
    #[instrument(skip(self), fields(batch_size = self.config.batch_size))]
    pub async fn load(
        &self,
        index_name: &str,
        doc_type: &str,
        data_dir: &Path,
    ) -> Result<LoadReport, MigrationError> {
        let files = list_document_files(data_dir).await?;
        let mut report = LoadReport::new(index_name, doc_type);
        report.total = files.len();
        info!(
            index = %index_name,
            documents = files.len(),
            directory = %data_dir.display(),
            "Loading documents"
        );

        let batch_size = self.config.batch_size.max(1);
        for chunk in files.chunks(batch_size) {
            let mut batch = Batch::new();
            for (id, path) in chunk {
                match read_document(path).await {
                    Ok(body) => batch.insert(id.clone(), body),
                    Err(reason) => {
                        warn!(document = %id, reason = %reason, "Skipping unreadable document");
                        report.record_errors([DocumentError::new(id, INVALID_DOCUMENT, reason)]);
                    }
                }
            }
            if batch.is_empty() {
                continue;
            }

            report.batches += 1;
            report.submitted += batch.len();
            match self.registry.insert_batch(index_name, doc_type, &batch).await {
                Ok(errors) => {
                    debug!(
                        batch = report.batches,
                        documents = batch.len(),
                        failed = errors.len(),
                        "Batch submitted"
                    );
                    report.record_errors(errors);
                }
                Err(e) => {
                    warn!(batch = report.batches, error = %e, "Bulk request failed");
                    let reason = e.to_string();
                    report.record_errors(batch.iter().map(|(id, body)| {
                        DocumentError::new(id, BULK_REQUEST_FAILED, reason.clone())
                            .with_source(Some(body.clone()))
                    }));
                }
            }
        }

        report.finish();
        info!(
            index = %index_name,
            total = report.total,
            submitted = report.submitted,
            batches = report.batches,
            failed = report.failed(),
            "Load completed"
        );
        for error in &report.errors {
            warn!(
                document = %error.document_id,
                error_type = %error.error_type,
                reason = %error.reason,
                "Document failed to load"
            );
        }
        Ok(report)
    }
}

/// `(document id, path)` for every document file in `dir`, sorted by file name.
async fn list_document_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, MigrationError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => MigrationError::not_found(format!("data directory {}", dir.display())),
        _ => MigrationError::io(format!("reading {}: {}", dir.display(), e)),
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MigrationError::io(format!("reading {}: {}", dir.display(), e)))?
    {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(id) = name.strip_suffix(DOCUMENT_EXTENSION) {
            if !id.is_empty() {
                files.push((id.to_string(), entry.path()));
            }
        }
    }
    files.sort();
    Ok(files)
}

async fn read_document(path: &Path) -> Result<Value, String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}
