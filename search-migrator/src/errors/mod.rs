//! Error types for the search migrator.

use thiserror::Error;

use search_migrator_repository::RegistryError;
use search_migrator_shared::VersionParseError;

/// Errors that abort a migration run.
///
/// Per-document load failures are not errors; they are collected in the
/// `LoadReport`.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A version string could not be parsed.
    #[error("Version parse error: {0}")]
    Parse(#[from] VersionParseError),

    /// A required directory or file is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A registry call failed.
    #[error("Registry error during {step}: {source}")]
    Transport {
        step: &'static str,
        #[source]
        source: RegistryError,
    },

    /// A schema artifact or mapping definition is unreadable or not valid JSON.
    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No alias exists yet and no explicit version was requested.
    #[error("Alias '{0}' has no active index and no explicit version was given")]
    NoActiveAlias(String),
}

impl MigrationError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Wrap a registry error with the step that raised it.
    pub fn transport(step: &'static str, source: RegistryError) -> Self {
        Self::Transport { step, source }
    }

    /// Create an invalid artifact error.
    pub fn invalid_artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_names_step() {
        let error = MigrationError::transport("alias lookup", RegistryError::connection("refused"));
        assert_eq!(
            error.to_string(),
            "Registry error during alias lookup: Connection error: refused"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = search_migrator_shared::SemanticVersion::parse("x").unwrap_err();
        let error: MigrationError = parse.into();
        assert!(matches!(error, MigrationError::Parse(_)));
    }
}
