//! Dependency initialization and wiring for the search migrator.

use std::sync::Arc;

use tracing::info;

use search_migrator_repository::{IndexRegistry, OpenSearchRegistry};

use crate::config::MigratorConfig;
use crate::errors::MigrationError;
use crate::orchestrator::Migrator;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured migrator ready to run.
    pub migrator: Migrator,
}

impl Dependencies {
    /// Build the OpenSearch registry client and the migrator around it.
    ///
    /// No request is sent here; the first registry call happens when the
    /// migrator runs.
    pub fn new(config: MigratorConfig) -> Result<Self, MigrationError> {
        info!(
            opensearch_url = %config.registry.url,
            auth = config.registry.auth.scheme(),
            alias = %config.alias,
            write_alias = config.write_alias,
            batch_size = config.batch_size,
            only_version = ?config.only_version.as_ref().map(|v| v.to_string()),
            "Initializing dependencies"
        );

        let registry = OpenSearchRegistry::new(&config.registry).map_err(|e| {
            MigrationError::config(format!("Failed to create OpenSearch registry: {}", e))
        })?;
        let registry: Arc<dyn IndexRegistry> = Arc::new(registry);

        Ok(Self {
            migrator: Migrator::new(registry, config),
        })
    }
}
