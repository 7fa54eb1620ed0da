//! Document batches and per-document error records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bounded set of documents submitted to the registry in one bulk write.
///
/// Documents are keyed by document id. Batches are built per chunk and never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    documents: BTreeMap<String, Value>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous body with the same id.
    pub fn insert(&mut self, id: impl Into<String>, body: Value) {
        self.documents.insert(id.into(), body);
    }

    /// Body for a document id.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.documents.get(id)
    }

    /// Iterate over `(id, body)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.documents.iter()
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the batch holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<(String, Value)> for Batch {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

/// A single document that failed to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentError {
    /// Id of the failed document.
    pub document_id: String,
    /// Error category reported by the registry (e.g. `mapper_parsing_exception`).
    pub error_type: String,
    /// Human-readable failure reason.
    pub reason: String,
    /// The submitted body, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl DocumentError {
    /// Create a document error without a source body.
    pub fn new(
        document_id: impl Into<String>,
        error_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            error_type: error_type.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Attach the submitted body.
    pub fn with_source(mut self, source: Option<Value>) -> Self {
        self.source = source;
        self
    }
}
