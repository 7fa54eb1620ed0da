//! # Search Migrator
//!
//! Migrates a search index alias across successive schema versions without
//! downtime. Each schema version gets its own physical index named
//! `<alias>_<version>`; clients only ever query the alias.
//!
//! ## Architecture
//!
//! 1. **Catalog**: Reads the versioned schema artifacts from disk
//! 2. **Planner**: Picks the single next version to deploy
//! 3. **Deployer**: Creates the index and, on first deployment, sets the alias
//! 4. **Loader**: Bulk loads documents into a versioned index
//! 5. **Orchestrator**: Runs a `deploy` or `load` invocation end to end
//!
//! ## Modules
//!
//! - [`catalog`]: Versioned schema artifacts
//! - [`config`]: Configuration and dependency initialization
//! - [`deployer`]: Index creation and alias binding
//! - [`errors`]: Error types for the migrator
//! - [`loader`]: Chunked document loading and run reports
//! - [`orchestrator`]: End-to-end runs
//! - [`planner`]: Deployment decisions

pub mod catalog;
pub mod config;
pub mod deployer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod planner;

pub use config::{Cli, Command, Dependencies, MigratorConfig};
pub use errors::MigrationError;
pub use orchestrator::Migrator;
