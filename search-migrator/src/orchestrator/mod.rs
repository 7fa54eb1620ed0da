//! Orchestrator module for the search migrator.
//!
//! Runs one `deploy` or `load` invocation end to end: read the schema catalog,
//! read the registry state fresh, then act on it. Every step runs in sequence.

use std::sync::Arc;

use tracing::{info, instrument};

use search_migrator_repository::{versioned_index_name, IndexRegistry};
use search_migrator_shared::{DeployedIndexState, DeploymentDecision};

use crate::catalog::VersionCatalog;
use crate::config::MigratorConfig;
use crate::deployer::{DeploymentOutcome, IndexDeployer};
use crate::errors::MigrationError;
use crate::loader::{BatchLoader, LoadReport, LoaderConfig};
use crate::planner;

/// Drives a migration run against an index registry.
pub struct Migrator {
    registry: Arc<dyn IndexRegistry>,
    config: MigratorConfig,
}

impl Migrator {
    /// Create a new migrator.
    pub fn new(registry: Arc<dyn IndexRegistry>, config: MigratorConfig) -> Self {
        Self { registry, config }
    }

    /// The configuration this migrator runs with.
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Plan and deploy the next version.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(DeploymentOutcome))` - A version was deployed
    /// * `Ok(None)` - Nothing needed deploying
    /// * `Err(MigrationError)` - The run stopped at the step named in the error
    #[instrument(skip(self), fields(alias = %self.config.alias))]
    pub async fn deploy(&self) -> Result<Option<DeploymentOutcome>, MigrationError> {
        let catalog = self.scan_catalog().await?;
        let deployed = self.lookup().await?;

        let version = match planner::plan(&catalog, &deployed, self.config.only_version.as_ref()) {
            DeploymentDecision::Deploy(version) => version,
            DeploymentDecision::NoAction(reason) => {
                info!(reason = %reason, "Deployment finished without changes");
                return Ok(None);
            }
        };

        let deployer = IndexDeployer::new(
            self.registry.clone(),
            self.config.alias.clone(),
            self.config.write_alias,
        );
        let outcome = deployer.deploy(&catalog, &deployed, &version).await?;
        info!(
            version = %outcome.version,
            index = %outcome.index_name,
            created = outcome.created,
            alias_updated = outcome.alias_updated,
            "Deployment finished"
        );
        Ok(Some(outcome))
    }

    /// Load documents into the index of the requested or current version.
    ///
    /// When a report directory is configured the report is also written there.
    #[instrument(skip(self), fields(alias = %self.config.alias))]
    pub async fn load(&self) -> Result<LoadReport, MigrationError> {
        let catalog = self.scan_catalog().await?;
        let version = match &self.config.only_version {
            Some(version) => version.clone(),
            None => self
                .lookup()
                .await?
                .current_version
                .ok_or_else(|| MigrationError::NoActiveAlias(self.config.alias.clone()))?,
        };
        let artifact = catalog.get(&version).ok_or_else(|| {
            MigrationError::not_found(format!("no schema artifact for version {}", version))
        })?;

        let index_name = versioned_index_name(&self.config.alias, &version);
        let loader = BatchLoader::with_config(
            self.registry.clone(),
            LoaderConfig {
                batch_size: self.config.batch_size,
            },
        );
        let report = loader
            .load(&index_name, &artifact.base_filename, &self.config.data_dir)
            .await?;

        if let Some(dir) = &self.config.report_dir {
            let path = report.write_to(dir).await?;
            info!(path = %path.display(), "Wrote load report");
        }
        Ok(report)
    }

    async fn scan_catalog(&self) -> Result<VersionCatalog, MigrationError> {
        VersionCatalog::scan(&self.config.glide_dir, &self.config.mappings_dir).await
    }

    async fn lookup(&self) -> Result<DeployedIndexState, MigrationError> {
        self.registry
            .lookup(&self.config.alias, self.config.write_alias)
            .await
            .map_err(|e| MigrationError::transport("alias lookup", e))
    }
}
