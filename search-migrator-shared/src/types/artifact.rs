//! Versioned schema artifact descriptor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::version::SemanticVersion;

/// A schema artifact produced for one version.
///
/// One descriptor exists per schema file found in the artifact directory. The
/// descriptor is immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedArtifact {
    /// The version the artifact describes.
    pub version: SemanticVersion,
    /// Base name used as the document type when loading documents.
    pub base_filename: String,
    /// Path of the index mapping definition for this version.
    pub mapping_definition_path: PathBuf,
}

impl VersionedArtifact {
    /// Create a new artifact descriptor.
    pub fn new(
        version: SemanticVersion,
        base_filename: impl Into<String>,
        mapping_definition_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version,
            base_filename: base_filename.into(),
            mapping_definition_path: mapping_definition_path.into(),
        }
    }
}
