//! OpenSearch registry implementation.
//!
//! This module provides the concrete implementation of `IndexRegistry`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesGetAliasParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use search_migrator_shared::{Batch, DeployedIndexState, DocumentError};

use crate::config::RegistryConfig;
use crate::errors::RegistryError;
use crate::interfaces::IndexRegistry;
use crate::opensearch::responses;

/// Error type OpenSearch reports when creating an index that already exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch registry implementation.
///
/// # Example
///
/// ```ignore
/// use search_migrator_repository::{OpenSearchRegistry, RegistryAuth, RegistryConfig};
///
/// let config = RegistryConfig::new("http://localhost:9200", RegistryAuth::None);
/// let registry = OpenSearchRegistry::new(&config)?;
/// let state = registry.lookup("people", false).await?;
/// ```
pub struct OpenSearchRegistry {
    client: OpenSearch,
}

impl OpenSearchRegistry {
    /// Create a registry client for the configured URL and credentials.
    ///
    /// No request is sent; connection problems surface on the first call.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchRegistry)` - A new registry client
    /// * `Err(RegistryError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let parsed_url = Url::parse(&config.url)
            .map_err(|e| RegistryError::config(format!("invalid registry URL: {}", e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(credentials) = config.auth.credentials() {
            builder = builder.auth(credentials);
        }
        let transport = builder
            .build()
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        info!(
            url = %config.url,
            auth = config.auth.scheme(),
            "Created OpenSearch registry"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Map a non-success status to an error, singling out rejected credentials.
    fn status_error(
        operation: &str,
        status: u16,
        body: &str,
        make: fn(String) -> RegistryError,
    ) -> RegistryError {
        error!(operation, status, body = %body, "Registry request failed");
        match status {
            401 | 403 => RegistryError::unauthorized(format!(
                "{} rejected with status {}: {}",
                operation, status, body
            )),
            _ => make(format!("{} failed with status {}: {}", operation, status, body)),
        }
    }

    /// Indices currently bound to `alias`; empty when the alias does not exist.
    async fn current_alias_members(&self, alias: &str) -> Result<Vec<String>, RegistryError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        let status = response.status_code().as_u16();
        if status == 404 {
            return Ok(Vec::new());
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("get alias", status, &body, RegistryError::AliasError));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::parse(e.to_string()))?;
        Ok(responses::alias_members(&body))
    }
}

#[async_trait]
impl IndexRegistry for OpenSearchRegistry {
    async fn lookup(
        &self,
        alias: &str,
        prefer_write_alias: bool,
    ) -> Result<DeployedIndexState, RegistryError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::None)
            .send()
            .await
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        let status = response.status_code().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("alias lookup", status, &body, RegistryError::AliasError));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::parse(e.to_string()))?;
        let state = responses::parse_alias_listing(alias, prefer_write_alias, &body)?;

        debug!(
            alias = %alias,
            current = ?state.current_version,
            deployed = ?state.deployed_versions,
            "Looked up index versions"
        );
        Ok(state)
    }

    async fn create_index(&self, index_name: &str, mapping: &Value) -> Result<(), RegistryError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index_name))
            .body(mapping.clone())
            .send()
            .await
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        let status = response.status_code().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            if status == 400 && body.contains(ALREADY_EXISTS_ERROR) {
                warn!(index = %index_name, "Index already exists");
                return Err(RegistryError::conflict(index_name));
            }
            return Err(Self::status_error(
                "create index",
                status,
                &body,
                RegistryError::IndexCreationError,
            ));
        }

        info!(index = %index_name, "Created index");
        Ok(())
    }

    async fn insert_batch(
        &self,
        index_name: &str,
        doc_type: &str,
        batch: &Batch,
    ) -> Result<Vec<DocumentError>, RegistryError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        // OpenSearch has no mapping types; the document type is carried for tracing only.
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(batch.len() * 2);
        for (id, document) in batch.iter() {
            body.push(json!({ "index": { "_id": id } }).into());
            body.push(document.clone().into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        let status = response.status_code().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(
                "bulk insert",
                status,
                &body,
                RegistryError::BulkIndexError,
            ));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::parse(e.to_string()))?;
        let errors = responses::parse_bulk_response(&body, batch)?;

        debug!(
            index = %index_name,
            doc_type = %doc_type,
            documents = batch.len(),
            failed = errors.len(),
            "Bulk insert completed"
        );
        Ok(errors)
    }

    async fn update_alias(
        &self,
        alias: &str,
        target_index: &str,
        write_alias: bool,
    ) -> Result<(), RegistryError> {
        let members = self.current_alias_members(alias).await?;
        let actions = responses::alias_update_actions(alias, &members, target_index, write_alias);

        let response = self
            .client
            .indices()
            .update_aliases()
            .body(actions)
            .send()
            .await
            .map_err(|e| RegistryError::connection(e.to_string()))?;

        let status = response.status_code().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(
                "update alias",
                status,
                &body,
                RegistryError::AliasError,
            ));
        }

        info!(
            alias = %alias,
            target = %target_index,
            previous = ?members,
            write_alias,
            "Alias repointed"
        );
        Ok(())
    }
}
