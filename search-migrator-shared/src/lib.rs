//! # Search Migrator Shared
//!
//! This crate defines the value types shared across the search migrator: schema
//! versions, versioned schema artifacts, the deployed state reported by the
//! index registry, document batches and deployment decisions.

pub mod types;

pub use types::artifact::VersionedArtifact;
pub use types::batch::{Batch, DocumentError};
pub use types::decision::{DeploymentDecision, NoActionReason};
pub use types::index_state::DeployedIndexState;
pub use types::version::{SemanticVersion, VersionParseError};
