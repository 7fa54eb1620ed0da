//! Index registry error types.

use thiserror::Error;

/// Errors from index registry operations.
///
/// Used by the `IndexRegistry` trait for every call. Only `ConflictError` is
/// expected to be recovered by callers; the rest abort the operation that
/// raised them.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry could not be reached or the request could not be sent.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The registry rejected the credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The index already exists.
    #[error("Index already exists: {0}")]
    ConflictError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to read or update an alias.
    #[error("Alias error: {0}")]
    AliasError(String),

    /// The bulk request as a whole failed.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to parse a response from the registry.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The registry connection is misconfigured.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RegistryError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an unauthorized error.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a conflict error for an index name.
    pub fn conflict(index_name: impl Into<String>) -> Self {
        Self::ConflictError(index_name.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an alias error.
    pub fn alias(msg: impl Into<String>) -> Self {
        Self::AliasError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether this error reports an index that already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict() {
        assert!(RegistryError::conflict("people_1.0").is_conflict());
        assert!(!RegistryError::connection("refused").is_conflict());
        assert!(!RegistryError::index_creation("bad mapping").is_conflict());
    }

    #[test]
    fn test_messages_name_the_failure() {
        assert_eq!(
            RegistryError::conflict("people_1.0").to_string(),
            "Index already exists: people_1.0"
        );
        assert_eq!(
            RegistryError::unauthorized("status 401").to_string(),
            "Unauthorized: status 401"
        );
    }
}
