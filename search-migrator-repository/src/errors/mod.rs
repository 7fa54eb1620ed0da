//! Error types for the search migrator repository.
//!
//! This module provides a unified error type for all index registry operations.

mod registry_error;

pub use registry_error::RegistryError;
