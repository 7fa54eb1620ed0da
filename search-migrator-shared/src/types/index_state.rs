//! Deployed index state as reported by the index registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::version::SemanticVersion;

/// Snapshot of which index versions exist behind an alias.
///
/// This is read fresh from the registry for every planning decision and never
/// cached across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedIndexState {
    /// The version the alias currently points to, or `None` if the alias does not exist.
    pub current_version: Option<SemanticVersion>,
    /// Every index version that physically exists, aliased or not.
    pub deployed_versions: BTreeSet<SemanticVersion>,
}

impl DeployedIndexState {
    /// Create a state snapshot.
    pub fn new(
        current_version: Option<SemanticVersion>,
        deployed_versions: impl IntoIterator<Item = SemanticVersion>,
    ) -> Self {
        Self {
            current_version,
            deployed_versions: deployed_versions.into_iter().collect(),
        }
    }

    /// Whether an index for `version` physically exists.
    pub fn is_deployed(&self, version: &SemanticVersion) -> bool {
        self.deployed_versions.contains(version)
    }

    /// Physically existing versions strictly greater than `floor`, ascending.
    pub fn deployed_above(&self, floor: &SemanticVersion) -> Vec<SemanticVersion> {
        self.deployed_versions
            .iter()
            .filter(|v| v.is_greater_than(floor))
            .cloned()
            .collect()
    }
}
