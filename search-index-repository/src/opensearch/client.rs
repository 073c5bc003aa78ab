//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchBackend` and
//! `BackendConnector` using the OpenSearch Rust client.

use std::sync::Arc;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutMappingParts},
    params::Refresh,
    BulkParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::BackendError;
use crate::interfaces::{BackendConnector, SearchBackend};
use crate::opensearch::index_config::OpenSearchConfig;
use crate::opensearch::responses::{
    document_id, error_reason, error_type, is_healthy, mapping_failure, parse_bulk_items,
    parse_search_response, unwrap_type_mapping, INDEX_NOT_FOUND, RESOURCE_ALREADY_EXISTS,
};
use crate::types::BulkItemOutcome;
use search_index_shared::{IndexItem, SearchQuery, SearchResponse};

/// OpenSearch backend handle.
///
/// Document types are kept apart inside an index by prefixing the document
/// id with the type name.
///
/// # Example
///
/// ```ignore
/// use search_index_repository::opensearch::{OpenSearchBackend, OpenSearchConfig};
/// use search_index_repository::interfaces::SearchBackend;
/// use search_index_shared::IndexItem;
///
/// let backend = OpenSearchBackend::new(OpenSearchConfig::new("http://localhost:9200"))?;
///
/// let item = IndexItem::new("rules", "rule", "squid:S1234", r#"{"key": "squid:S1234"}"#);
/// backend.index_document(&item).await?;
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
    config: OpenSearchConfig,
}

impl OpenSearchBackend {
    /// Create a new OpenSearch backend for the configured URL.
    ///
    /// No request is sent; reachability is checked by `health_check`.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A new backend handle
    /// * `Err(BackendError::ConnectionError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: OpenSearchConfig) -> Result<Self, BackendError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| BackendError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| BackendError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            shards = config.index_settings.number_of_shards,
            replicas = config.index_settings.number_of_replicas,
            "Created OpenSearch client"
        );

        Ok(Self { client, config })
    }

    /// Read an error body, returning its OpenSearch error type and reason.
    async fn read_error(response: Response) -> (Option<String>, String) {
        let body = response.text().await.unwrap_or_default();
        (error_type(&body), error_reason(&body))
    }
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    async fn health_check(&self) -> Result<bool, BackendError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))?;

        let healthy = is_healthy(&health);
        debug!(status = %health["status"], healthy, "OpenSearch cluster health");
        Ok(healthy)
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(BackendError::connection(format!(
                "Index existence check for {} returned status {}",
                index, status
            ))),
        }
    }

    async fn create_index(&self, index: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(self.config.index_settings.to_body())
            .send()
            .await
            .map_err(|e| BackendError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }

        let (kind, reason) = Self::read_error(response).await;
        if kind.as_deref() == Some(RESOURCE_ALREADY_EXISTS) {
            return Err(BackendError::IndexAlreadyExists(index.to_string()));
        }

        Err(BackendError::index_creation(format!(
            "Create index {} failed with status {}: {}",
            index, status, reason
        )))
    }

    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &str,
    ) -> Result<(), BackendError> {
        let parsed: Value = serde_json::from_str(mapping)
            .map_err(|e| BackendError::mapping_parse(e.to_string()))?;
        let body = unwrap_type_mapping(doc_type, parsed);

        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| BackendError::mapping(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }

        let (kind, reason) = Self::read_error(response).await;
        Err(mapping_failure(
            index,
            doc_type,
            status.as_u16(),
            kind.as_deref(),
            reason,
        ))
    }

    async fn index_document(&self, item: &IndexItem) -> Result<(), BackendError> {
        let source: Value = serde_json::from_slice(&item.payload)
            .map_err(|e| BackendError::serialization(e.to_string()))?;
        let doc_id = document_id(&item.key.doc_type, &item.key.id);

        let response = self
            .client
            .index(IndexParts::IndexId(&item.key.index, &doc_id))
            .body(source)
            .send()
            .await
            .map_err(|e| BackendError::index(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            debug!(index = %item.key.index, doc_id = %doc_id, "Document indexed");
            return Ok(());
        }

        let (kind, reason) = Self::read_error(response).await;
        if kind.as_deref() == Some(INDEX_NOT_FOUND) {
            return Err(BackendError::IndexNotFound(item.key.index.clone()));
        }

        error!(status = %status, reason = %reason, "Index request failed");
        Err(BackendError::index(format!(
            "Index failed with status {}: {}",
            status, reason
        )))
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn bulk_index(
        &self,
        items: &[IndexItem],
        refresh: bool,
    ) -> Result<Vec<BulkItemOutcome>, BackendError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(items.len() * 2);
        let mut sent = Vec::with_capacity(items.len());
        let mut outcomes = Vec::new();

        for (position, item) in items.iter().enumerate() {
            let source: Value = match serde_json::from_slice(&item.payload) {
                Ok(source) => source,
                Err(e) => {
                    outcomes.push(BulkItemOutcome::failure(
                        position,
                        format!("payload is not valid JSON: {}", e),
                    ));
                    continue;
                }
            };

            let doc_id = document_id(&item.key.doc_type, &item.key.id);
            body.push(json!({"index": {"_index": item.key.index, "_id": doc_id}}).into());
            body.push(source.into());
            sent.push(position);
        }

        if sent.is_empty() {
            return Ok(outcomes);
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .refresh(if refresh { Refresh::True } else { Refresh::False })
            .body(body)
            .send()
            .await
            .map_err(|e| BackendError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let (_, reason) = Self::read_error(response).await;
            return Err(BackendError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, reason
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))?;

        outcomes.extend(parse_bulk_items(&response_body, &sent)?);
        outcomes.sort_by_key(|outcome| outcome.position);
        Ok(outcomes)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, BackendError> {
        let indices = [query.index.as_str()];
        let mut request = self
            .client
            .search(SearchParts::Index(&indices))
            .body(query.body.clone());
        if let Some(from) = query.from {
            request = request.from(from as i64);
        }
        if let Some(size) = query.size {
            request = request.size(size as i64);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let (kind, reason) = Self::read_error(response).await;
            if kind.as_deref() == Some(INDEX_NOT_FOUND) {
                return Err(BackendError::IndexNotFound(query.index.clone()));
            }
            error!(status = %status, reason = %reason, "Search request failed");
            return Err(BackendError::query(format!(
                "Search failed with status {}: {}",
                status, reason
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))?;

        parse_search_response(&body)
    }

    async fn close(&self) -> Result<(), BackendError> {
        // The HTTP transport holds no server-side session
        debug!(url = %self.config.url, "Closing OpenSearch client");
        Ok(())
    }
}

/// Opens `OpenSearchBackend` handles from a fixed configuration.
#[derive(Debug, Clone)]
pub struct OpenSearchConnector {
    config: OpenSearchConfig,
}

impl OpenSearchConnector {
    /// Create a connector for `config`.
    pub fn new(config: OpenSearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendConnector for OpenSearchConnector {
    async fn connect(&self) -> Result<Arc<dyn SearchBackend>, BackendError> {
        let backend = OpenSearchBackend::new(self.config.clone())?;
        Ok(Arc::new(backend))
    }
}
