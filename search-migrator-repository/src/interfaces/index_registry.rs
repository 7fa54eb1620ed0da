//! Index registry trait definition.
//!
//! This module defines the operations the migrator needs from a search engine:
//! reading alias state, creating indices, bulk loading documents and
//! repointing aliases.

use async_trait::async_trait;
use serde_json::Value;

use search_migrator_shared::{Batch, DeployedIndexState, DocumentError};

use crate::errors::RegistryError;

/// Abstracts the search engine holding the versioned indices.
///
/// Implementations do not retry. A transport failure is returned to the caller,
/// which decides whether the run can continue.
#[async_trait]
pub trait IndexRegistry: Send + Sync {
    /// Look up which index versions exist for `alias` and which one is active.
    ///
    /// Never mutates registry state. When `prefer_write_alias` is set and the
    /// alias has several members, the member flagged as write index is the
    /// active one.
    ///
    /// # Returns
    ///
    /// * `Ok(DeployedIndexState)` - The current alias target and all physical versions
    /// * `Err(RegistryError)` - If the registry is unreachable or the response is malformed
    async fn lookup(
        &self,
        alias: &str,
        prefer_write_alias: bool,
    ) -> Result<DeployedIndexState, RegistryError>;

    /// Create an index from a mapping definition.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(RegistryError::ConflictError)` - If an index with this name already exists
    /// * `Err(RegistryError)` - For any other failure
    async fn create_index(&self, index_name: &str, mapping: &Value) -> Result<(), RegistryError>;

    /// Bulk-insert a batch of documents into an index.
    ///
    /// The write is best effort: documents that succeed are kept even when
    /// others fail, and each failure is returned as a `DocumentError`.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The physical index to write to
    /// * `doc_type` - Base name of the document type being loaded
    /// * `batch` - Documents keyed by id
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DocumentError>)` - Per-document failures, empty when all succeeded
    /// * `Err(RegistryError)` - If the bulk request itself failed
    async fn insert_batch(
        &self,
        index_name: &str,
        doc_type: &str,
        batch: &Batch,
    ) -> Result<Vec<DocumentError>, RegistryError>;

    /// Point `alias` at `target_index` in a single atomic request.
    ///
    /// Every other index currently behind the alias is removed in the same
    /// request, so readers never observe the alias unset or doubly bound.
    async fn update_alias(
        &self,
        alias: &str,
        target_index: &str,
        write_alias: bool,
    ) -> Result<(), RegistryError>;
}
