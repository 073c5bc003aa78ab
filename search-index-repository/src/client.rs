//! Search index facade.
//!
//! `SearchIndex` is the surface application code uses: it owns the backend
//! handle between `start` and `stop`, provisions mappings, and routes writes
//! and queries to the backend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::bulk::BulkWriter;
use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::{BackendConnector, MappingLoader, SearchBackend};
use crate::opensearch::TYPE_SEPARATOR;
use crate::provisioner::SchemaProvisioner;
use crate::types::BulkWriteOutcome;
use crate::writer::DocumentWriter;
use search_index_shared::{group_by, IndexItem, SearchQuery, SearchResponse, TypeKey};

/// The main entry point for synchronizing documents with the search backend.
///
/// The backend handle is acquired by `start` and released by `stop`.
/// Operations called in between share the handle; operations called outside
/// that window fail with `SearchIndexError::NotStarted`.
///
/// # Example
///
/// ```ignore
/// let index = SearchIndex::new(
///     Box::new(OpenSearchConnector::new(OpenSearchConfig::new("http://localhost:9200"))),
///     Box::new(FileMappingLoader::new("./mappings")),
/// );
/// index.start().await?;
/// index.ensure_mapping("rules", "rule", "/rules/rule.json").await?;
/// let outcome = index.bulk_put(&items).await?;
/// index.stop().await;
/// ```
pub struct SearchIndex {
    connector: Box<dyn BackendConnector>,
    mappings: Box<dyn MappingLoader>,
    config: SearchIndexConfig,
    connection: RwLock<Option<Arc<dyn SearchBackend>>>,
    provisioner: SchemaProvisioner,
    registered: RwLock<HashMap<TypeKey, String>>,
    provisioning: Mutex<()>,
}

impl SearchIndex {
    /// Create a SearchIndex with default configuration.
    pub fn new(connector: Box<dyn BackendConnector>, mappings: Box<dyn MappingLoader>) -> Self {
        Self::with_config(connector, mappings, SearchIndexConfig::default())
    }

    /// Create a SearchIndex with custom configuration.
    pub fn with_config(
        connector: Box<dyn BackendConnector>,
        mappings: Box<dyn MappingLoader>,
        config: SearchIndexConfig,
    ) -> Self {
        Self {
            connector,
            mappings,
            config,
            connection: RwLock::new(None),
            provisioner: SchemaProvisioner::new(),
            registered: RwLock::new(HashMap::new()),
            provisioning: Mutex::new(()),
        }
    }

    /// Acquire and verify the backend handle.
    ///
    /// If the freshly acquired handle fails its health check it is closed
    /// before the error is returned. Starting twice is a no-op.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), SearchIndexError> {
        let mut connection = self.connection.write().await;
        if connection.is_some() {
            debug!("Search index already started");
            return Ok(());
        }

        let backend = self
            .connector
            .connect()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match backend.health_check().await {
            Ok(true) => {}
            Ok(false) => {
                release(backend.as_ref()).await;
                return Err(SearchIndexError::connection("Search backend is unhealthy"));
            }
            Err(e) => {
                release(backend.as_ref()).await;
                return Err(SearchIndexError::connection(format!(
                    "Search backend health check failed: {}",
                    e
                )));
            }
        }

        *connection = Some(backend);
        info!("Search index started");
        Ok(())
    }

    /// Release the backend handle.
    ///
    /// Safe to call when never started, or more than once. A failure to close
    /// is logged; the handle is dropped either way.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let backend = self.connection.write().await.take();
        if let Some(backend) = backend {
            release(backend.as_ref()).await;
            info!("Search index stopped");
        }
    }

    /// Whether `start` has acquired a handle that `stop` has not released.
    pub async fn is_started(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Register the mapping resource for `(index, doc_type)`.
    ///
    /// With lazy provisioning enabled, the mapping is applied before the first
    /// write touching the pair, and again after the backend reports the index
    /// absent.
    pub async fn register_mapping(
        &self,
        index: &str,
        doc_type: &str,
        resource: &str,
    ) -> Result<(), SearchIndexError> {
        let key = TypeKey::new(index, doc_type);
        validate_type_key(&key)?;

        self.registered
            .write()
            .await
            .insert(key, resource.to_string());
        Ok(())
    }

    /// Ensure `index` exists and apply the mapping stored at `resource` for
    /// `doc_type`.
    ///
    /// The resource is loaded before the backend is touched, so a missing or
    /// malformed resource fails with `SearchIndexError::MappingLoad` without
    /// any backend call.
    #[instrument(skip(self))]
    pub async fn ensure_mapping(
        &self,
        index: &str,
        doc_type: &str,
        resource: &str,
    ) -> Result<(), SearchIndexError> {
        let key = TypeKey::new(index, doc_type);
        validate_type_key(&key)?;

        let mapping = self.mappings.load(resource)?;
        let backend = self.backend().await?;

        self.provisioner
            .ensure_mapping(backend.as_ref(), &key, &mapping)
            .await
    }

    /// Upsert a single document.
    ///
    /// Failures are returned, not retried.
    #[instrument(skip(self, item), fields(key = %item.key))]
    pub async fn put(&self, item: &IndexItem) -> Result<(), SearchIndexError> {
        validate_item(item)?;
        let backend = self.backend().await?;

        self.provision_registered(backend.as_ref(), &item.type_key())
            .await?;

        let result = DocumentWriter::new(backend).put(item).await;
        if let Err(ref e) = result {
            if e.is_index_not_found() {
                self.provisioner.forget_index(&item.key.index).await;
            }
        }
        result
    }

    /// Write `items` in one bulk round trip, retrying rejected items once.
    ///
    /// An empty batch returns immediately without touching the backend.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkWriteOutcome)` - Including partial and transport failures
    /// * `Err(SearchIndexError)` - If not started, an item is invalid, or lazy provisioning fails
    #[instrument(skip(self, items), fields(total = items.len()))]
    pub async fn bulk_put(&self, items: &[IndexItem]) -> Result<BulkWriteOutcome, SearchIndexError> {
        if items.is_empty() {
            return Ok(BulkWriteOutcome::AllSucceeded { total: 0 });
        }

        for item in items {
            validate_item(item)?;
        }
        let backend = self.backend().await?;

        for key in group_by(items, |item| item.type_key()).into_keys() {
            self.provision_registered(backend.as_ref(), &key).await?;
        }

        let outcome = BulkWriter::new(backend, self.config.refresh_on_bulk)
            .bulk_put(items)
            .await;

        for failure in outcome.residual_failures() {
            if failure.error.is_index_not_found() {
                self.provisioner.forget_index(&failure.key.index).await;
            }
        }
        Ok(outcome)
    }

    /// Execute a query against the backend.
    pub async fn query(&self, query: &SearchQuery) -> Result<SearchResponse, SearchIndexError> {
        validate_identifier("index", &query.index)?;
        let backend = self.backend().await?;

        backend
            .search(query)
            .await
            .map_err(SearchIndexError::QueryError)
    }

    async fn backend(&self) -> Result<Arc<dyn SearchBackend>, SearchIndexError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(SearchIndexError::NotStarted)
    }

    /// Apply the registered mapping for `key` unless it is already applied.
    async fn provision_registered(
        &self,
        backend: &dyn SearchBackend,
        key: &TypeKey,
    ) -> Result<(), SearchIndexError> {
        if !self.config.lazy_provisioning || self.provisioner.is_provisioned(key).await {
            return Ok(());
        }

        let _guard = self.provisioning.lock().await;
        if self.provisioner.is_provisioned(key).await {
            return Ok(());
        }

        let resource = match self.registered.read().await.get(key) {
            Some(resource) => resource.clone(),
            None => return Ok(()),
        };

        debug!(key = %key, resource = %resource, "Provisioning registered mapping");
        let mapping = self.mappings.load(&resource)?;
        self.provisioner.ensure_mapping(backend, key, &mapping).await
    }
}

async fn release(backend: &dyn SearchBackend) {
    if let Err(e) = backend.close().await {
        warn!(error = %e, "Failed to close search backend connection");
    }
}

fn validate_identifier(kind: &str, value: &str) -> Result<(), SearchIndexError> {
    if value.is_empty() {
        return Err(SearchIndexError::validation(format!("{} is required", kind)));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(SearchIndexError::validation(format!(
            "{} must not contain whitespace: {:?}",
            kind, value
        )));
    }
    Ok(())
}

/// Document types are folded into backend ids after `TYPE_SEPARATOR`, so
/// they must not contain it.
fn validate_doc_type(doc_type: &str) -> Result<(), SearchIndexError> {
    validate_identifier("doc_type", doc_type)?;
    if doc_type.contains(TYPE_SEPARATOR) {
        return Err(SearchIndexError::validation(format!(
            "doc_type must not contain '{}': {:?}",
            TYPE_SEPARATOR, doc_type
        )));
    }
    Ok(())
}

fn validate_type_key(key: &TypeKey) -> Result<(), SearchIndexError> {
    validate_identifier("index", &key.index)?;
    validate_doc_type(&key.doc_type)
}

fn validate_item(item: &IndexItem) -> Result<(), SearchIndexError> {
    validate_identifier("index", &item.key.index)?;
    validate_doc_type(&item.key.doc_type)?;
    validate_identifier("id", &item.key.id)
}
