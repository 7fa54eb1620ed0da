//! # Search Migrator Repository
//!
//! This crate provides the `IndexRegistry` trait the migrator uses to inspect
//! and mutate the search engine, the error type shared by all registry
//! operations, and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::{RegistryAuth, RegistryConfig};
pub use errors::RegistryError;
pub use interfaces::IndexRegistry;
pub use opensearch::{version_from_index_name, versioned_index_name, OpenSearchRegistry};
