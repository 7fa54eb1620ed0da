//! Index deployment.
//!
//! Creates the index for a chosen version from its mapping definition and,
//! on the very first deployment, points the alias at it. Later deployments only
//! create the index so documents can be loaded before the switch.

use std::io::ErrorKind;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use search_migrator_repository::{versioned_index_name, IndexRegistry};
use search_migrator_shared::{DeployedIndexState, SemanticVersion};

use crate::catalog::VersionCatalog;
use crate::errors::MigrationError;

/// What a deployment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    /// Deployed version.
    pub version: SemanticVersion,
    /// Name of the versioned index.
    pub index_name: String,
    /// Whether this run created the index. `false` when it already existed.
    pub created: bool,
    /// Whether the alias was pointed at the index.
    pub alias_updated: bool,
}

/// Creates versioned indices and binds the alias on first deployment.
pub struct IndexDeployer {
    registry: Arc<dyn IndexRegistry>,
    alias: String,
    write_alias: bool,
}

impl IndexDeployer {
    /// Create a new deployer for `alias`.
    pub fn new(registry: Arc<dyn IndexRegistry>, alias: impl Into<String>, write_alias: bool) -> Self {
        Self {
            registry,
            alias: alias.into(),
            write_alias,
        }
    }

    /// Deploy `version`.
    ///
    /// The index is created before any alias change. An index that already
    /// exists is not an error, so a run interrupted between the two steps can
    /// simply be repeated.
    ///
    /// # Returns
    ///
    /// * `Ok(DeploymentOutcome)` - The index exists and, on first deployment, is aliased
    /// * `Err(MigrationError::NotFound)` - If the version or its mapping definition is missing
    /// * `Err(MigrationError::InvalidArtifact)` - If the mapping definition is not valid JSON
    /// * `Err(MigrationError::Transport)` - If index creation or the alias update fails
    #[instrument(skip(self, catalog, deployed, version), fields(alias = %self.alias, version = %version))]
    pub async fn deploy(
        &self,
        catalog: &VersionCatalog,
        deployed: &DeployedIndexState,
        version: &SemanticVersion,
    ) -> Result<DeploymentOutcome, MigrationError> {
        let artifact = catalog.get(version).ok_or_else(|| {
            MigrationError::not_found(format!("no schema artifact for version {}", version))
        })?;
        let mapping = read_mapping(&artifact.mapping_definition_path).await?;
        let index_name = versioned_index_name(&self.alias, version);

        let created = if deployed.is_deployed(version) {
            info!(index = %index_name, "Index already exists, skipping creation");
            false
        } else {
            match self.registry.create_index(&index_name, &mapping).await {
                Ok(()) => {
                    info!(index = %index_name, "Created index");
                    true
                }
                Err(e) if e.is_conflict() => {
                    warn!(index = %index_name, "Index was created concurrently or by an earlier run");
                    false
                }
                Err(e) => return Err(MigrationError::transport("create index", e)),
            }
        };

        let alias_updated = if deployed.current_version.is_none() {
            self.registry
                .update_alias(&self.alias, &index_name, self.write_alias)
                .await
                .map_err(|e| MigrationError::transport("update alias", e))?;
            info!(index = %index_name, "Alias now points to the new index");
            true
        } else {
            false
        };

        Ok(DeploymentOutcome {
            version: version.clone(),
            index_name,
            created,
            alias_updated,
        })
    }
}

async fn read_mapping(path: &std::path::Path) -> Result<Value, MigrationError> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            MigrationError::not_found(format!("mapping definition {}", path.display()))
        }
        _ => MigrationError::io(format!("reading {}: {}", path.display(), e)),
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| MigrationError::invalid_artifact(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use search_migrator_repository::RegistryError;
    use search_migrator_shared::{Batch, DocumentError, VersionedArtifact};
    use tempfile::{tempdir, TempDir};

    #[derive(Default)]
    struct MockRegistry {
        calls: Mutex<Vec<String>>,
        create_error: Option<RegistryError>,
        alias_error: Option<RegistryError>,
    }

    impl MockRegistry {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IndexRegistry for MockRegistry {
        async fn lookup(&self, _alias: &str, _write: bool) -> Result<DeployedIndexState, RegistryError> {
            Ok(DeployedIndexState::default())
        }

        async fn create_index(&self, index_name: &str, _mapping: &Value) -> Result<(), RegistryError> {
            self.calls.lock().unwrap().push(format!("create {}", index_name));
            match &self.create_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn insert_batch(
            &self,
            _index_name: &str,
            _doc_type: &str,
            _batch: &Batch,
        ) -> Result<Vec<DocumentError>, RegistryError> {
            Ok(Vec::new())
        }

        async fn update_alias(
            &self,
            alias: &str,
            target_index: &str,
            write_alias: bool,
        ) -> Result<(), RegistryError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("alias {} -> {} write={}", alias, target_index, write_alias));
            match &self.alias_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    fn catalog_with_mapping(versions: &[&str]) -> (TempDir, VersionCatalog) {
        let dir = tempdir().unwrap();
        let artifacts = versions
            .iter()
            .map(|s| {
                let path = dir.path().join(format!("{}.mappings.json", s));
                fs::write(&path, r#"{"mappings": {"properties": {}}}"#).unwrap();
                VersionedArtifact::new(v(s), "people", path)
            })
            .collect::<Vec<_>>();
        (dir, VersionCatalog::from_artifacts(artifacts))
    }

    #[tokio::test]
    async fn test_first_deploy_creates_then_aliases() {
        let registry = Arc::new(MockRegistry::default());
        let deployer = IndexDeployer::new(registry.clone(), "people", true);
        let (_dir, catalog) = catalog_with_mapping(&["2.0.0"]);

        let outcome = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0.0"))
            .await
            .unwrap();

        assert_eq!(outcome.index_name, "people_2.0.0");
        assert!(outcome.created);
        assert!(outcome.alias_updated);
        assert_eq!(
            registry.calls(),
            vec!["create people_2.0.0", "alias people -> people_2.0.0 write=true"]
        );
    }

    #[tokio::test]
    async fn test_incremental_deploy_leaves_alias_alone() {
        let registry = Arc::new(MockRegistry::default());
        let deployer = IndexDeployer::new(registry.clone(), "people", false);
        let (_dir, catalog) = catalog_with_mapping(&["1.0", "1.1"]);
        let deployed = DeployedIndexState::new(Some(v("1.0")), vec![v("1.0")]);

        let outcome = deployer.deploy(&catalog, &deployed, &v("1.1")).await.unwrap();

        assert!(outcome.created);
        assert!(!outcome.alias_updated);
        assert_eq!(registry.calls(), vec!["create people_1.1"]);
    }

    #[tokio::test]
    async fn test_conflict_is_treated_as_success() {
        let registry = Arc::new(MockRegistry {
            create_error: Some(RegistryError::conflict("people_2.0")),
            ..Default::default()
        });
        let deployer = IndexDeployer::new(registry.clone(), "people", false);
        let (_dir, catalog) = catalog_with_mapping(&["2.0"]);

        let outcome = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0"))
            .await
            .unwrap();

        assert!(!outcome.created);
        assert!(outcome.alias_updated);
    }

    #[tokio::test]
    async fn test_existing_index_is_not_recreated() {
        let registry = Arc::new(MockRegistry::default());
        let deployer = IndexDeployer::new(registry.clone(), "people", false);
        let (_dir, catalog) = catalog_with_mapping(&["2.0"]);
        let deployed = DeployedIndexState::new(None, vec![v("2.0")]);

        let outcome = deployer.deploy(&catalog, &deployed, &v("2.0")).await.unwrap();

        assert!(!outcome.created);
        assert_eq!(registry.calls(), vec!["alias people -> people_2.0 write=false"]);
    }

    #[tokio::test]
    async fn test_create_failure_stops_before_alias() {
        let registry = Arc::new(MockRegistry {
            create_error: Some(RegistryError::index_creation("mapper_parsing_exception")),
            ..Default::default()
        });
        let deployer = IndexDeployer::new(registry.clone(), "people", false);
        let (_dir, catalog) = catalog_with_mapping(&["2.0"]);

        let result = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0"))
            .await;

        assert!(matches!(
            result,
            Err(MigrationError::Transport { step: "create index", .. })
        ));
        assert_eq!(registry.calls(), vec!["create people_2.0"]);
    }

    #[tokio::test]
    async fn test_alias_failure_is_reported() {
        let registry = Arc::new(MockRegistry {
            alias_error: Some(RegistryError::alias("boom")),
            ..Default::default()
        });
        let deployer = IndexDeployer::new(registry, "people", false);
        let (_dir, catalog) = catalog_with_mapping(&["2.0"]);

        let result = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0"))
            .await;
        assert!(matches!(
            result,
            Err(MigrationError::Transport { step: "update alias", .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_mapping_is_not_found() {
        let registry = Arc::new(MockRegistry::default());
        let deployer = IndexDeployer::new(registry.clone(), "people", false);
        let catalog = VersionCatalog::from_artifacts([VersionedArtifact::new(
            v("2.0"),
            "people",
            "/definitely/missing.mappings.json",
        )]);

        let result = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0"))
            .await;

        assert!(matches!(result, Err(MigrationError::NotFound(_))));
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_mapping_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2_0.mappings.json");
        fs::write(&path, "{ nope").unwrap();
        let catalog = VersionCatalog::from_artifacts([VersionedArtifact::new(v("2.0"), "people", path)]);
        let deployer = IndexDeployer::new(Arc::new(MockRegistry::default()), "people", false);

        let result = deployer
            .deploy(&catalog, &DeployedIndexState::default(), &v("2.0"))
            .await;
        assert!(matches!(result, Err(MigrationError::InvalidArtifact { .. })));
    }

    #[tokio::test]
    async fn test_version_missing_from_catalog() {
        let deployer = IndexDeployer::new(Arc::new(MockRegistry::default()), "people", false);
        let result = deployer
            .deploy(&VersionCatalog::default(), &DeployedIndexState::default(), &v("3.0"))
            .await;
        assert!(matches!(result, Err(MigrationError::NotFound(_))));
    }
}
