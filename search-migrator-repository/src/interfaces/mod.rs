//! Interface definitions for the index registry.
//!
//! This module defines the abstract `IndexRegistry` trait so the planner,
//! deployer and loader can run against OpenSearch or a test double.

mod index_registry;

pub use index_registry::IndexRegistry;
