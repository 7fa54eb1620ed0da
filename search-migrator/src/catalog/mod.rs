//! Catalog of versioned schema artifacts.
//!
//! The artifact directory holds one JSON file per schema version, named
//! `baseline.schema.json` or `<major>_<minor>[_<patch>].schema.json`. The
//! mapping definition for an artifact lives next to the other generated
//! mappings as `<stem>.mappings.json`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use search_migrator_shared::{SemanticVersion, VersionedArtifact};

use crate::errors::MigrationError;

/// Suffix of schema artifact files.
pub const ARTIFACT_SUFFIX: &str = ".schema.json";

/// Suffix of mapping definition files.
pub const MAPPING_SUFFIX: &str = ".mappings.json";

/// Fields read from an artifact file. Everything else in it is ignored.
#[derive(Debug, Default, Deserialize)]
struct ArtifactHeader {
    name: Option<String>,
    version: Option<String>,
}

/// Schema artifacts keyed by version, in ascending version order.
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    artifacts: BTreeMap<SemanticVersion, VersionedArtifact>,
}

impl VersionCatalog {
    /// Build a catalog from already resolved artifacts.
    ///
    /// When two artifacts share a version the later one wins.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = VersionedArtifact>) -> Self {
        let mut catalog = Self::default();
        for artifact in artifacts {
            catalog.artifacts.remove(&artifact.version);
            catalog.artifacts.insert(artifact.version.clone(), artifact);
        }
        catalog
    }

    /// Scan `glide_dir` for schema artifacts.
    ///
    /// Files are visited in file-name order, so when two files resolve to the
    /// same version (`1_0` and `1_0_0`) the one sorting last wins.
    ///
    /// # Returns
    ///
    /// * `Ok(VersionCatalog)` - At least one artifact
    /// * `Err(MigrationError::NotFound)` - If the directory is missing or has no artifacts
    /// * `Err(MigrationError::Parse)` - If an artifact name is not a version
    /// * `Err(MigrationError::InvalidArtifact)` - If an artifact is not valid JSON
    pub async fn scan(glide_dir: &Path, mappings_dir: &Path) -> Result<Self, MigrationError> {
        let file_names = list_artifact_files(glide_dir).await?;
        if file_names.is_empty() {
            return Err(MigrationError::not_found(format!(
                "no *{} files in {}",
                ARTIFACT_SUFFIX,
                glide_dir.display()
            )));
        }

        let mut artifacts: BTreeMap<SemanticVersion, VersionedArtifact> = BTreeMap::new();
        for file_name in file_names {
            let stem = &file_name[..file_name.len() - ARTIFACT_SUFFIX.len()];
            let version = SemanticVersion::from_artifact_stem(stem)?;
            let path = glide_dir.join(&file_name);
            let header = read_header(&path).await?;

            if let Some(declared) = &header.version {
                match SemanticVersion::parse(declared) {
                    Ok(declared) if declared == version || version.is_zero() => {}
                    _ => warn!(
                        file = %file_name,
                        declared = %declared,
                        version = %version,
                        "Artifact declares a different version than its file name; using the file name"
                    ),
                }
            }

            let artifact = VersionedArtifact::new(
                version.clone(),
                header.name.unwrap_or_else(|| stem.to_string()),
                mappings_dir.join(format!("{}{}", stem, MAPPING_SUFFIX)),
            );
            debug!(file = %file_name, version = %version, "Found schema artifact");

            // Remove first so the key is re-created from the winning file name.
            if let Some(replaced) = artifacts.remove(&version) {
                warn!(
                    version = %version,
                    replaced = %replaced.mapping_definition_path.display(),
                    kept = %file_name,
                    "Two artifacts resolve to the same version"
                );
            }
            artifacts.insert(version, artifact);
        }

        info!(
            directory = %glide_dir.display(),
            versions = ?artifacts.keys().map(|v| v.to_string()).collect::<Vec<_>>(),
            "Loaded schema catalog"
        );
        Ok(Self { artifacts })
    }

    /// The artifact for `version`.
    pub fn get(&self, version: &SemanticVersion) -> Option<&VersionedArtifact> {
        self.artifacts.get(version)
    }

    /// Whether the catalog holds `version`.
    pub fn contains(&self, version: &SemanticVersion) -> bool {
        self.artifacts.contains_key(version)
    }

    /// All versions, ascending.
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = &SemanticVersion> {
        self.artifacts.keys()
    }

    /// The highest version.
    pub fn latest(&self) -> Option<&SemanticVersion> {
        self.artifacts.keys().next_back()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Sorted names of the artifact files in `dir`.
async fn list_artifact_files(dir: &Path) -> Result<Vec<String>, MigrationError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            MigrationError::not_found(format!("artifact directory {}", dir.display()))
        }
        _ => MigrationError::io(format!("reading {}: {}", dir.display(), e)),
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MigrationError::io(format!("reading {}: {}", dir.display(), e)))?
    {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.len() > ARTIFACT_SUFFIX.len() && name.ends_with(ARTIFACT_SUFFIX) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

async fn read_header(path: &Path) -> Result<ArtifactHeader, MigrationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrationError::invalid_artifact(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| MigrationError::invalid_artifact(path.display().to_string(), e.to_string()))
}
