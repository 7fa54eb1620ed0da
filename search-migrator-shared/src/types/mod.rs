//! This module defines the core data structures used across the search migrator.

pub mod artifact;
pub mod batch;
pub mod decision;
pub mod index_state;
pub mod version;

pub use artifact::VersionedArtifact;
pub use batch::{Batch, DocumentError};
pub use decision::{DeploymentDecision, NoActionReason};
pub use index_state::DeployedIndexState;
pub use version::{SemanticVersion, VersionParseError};
