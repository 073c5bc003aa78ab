//! Search backend trait definitions.
//!
//! `SearchBackend` is an opened, reusable connection to the remote document
//! store. `BackendConnector` acquires one; the `SearchIndex` lifecycle decides
//! when.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::types::BulkItemOutcome;
use search_index_shared::{IndexItem, SearchQuery, SearchResponse};

/// Abstract interface for an opened search backend connection.
///
/// Implementations can be swapped for different backends (OpenSearch, mock,
/// etc.).
///
/// # Thread Safety
///
/// Handles are shared between concurrent callers through `Arc`, so all
/// implementations must be `Send + Sync` and safe for concurrent calls.
/// Backends that are not must be serialized by the caller.
///
/// # Error Handling
///
/// All methods return `Result<T, BackendError>`. Each call resolves only once
/// the backend has answered.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Check if the backend is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the backend is healthy
    /// * `Ok(false)` - If the backend answered but reports itself unhealthy
    /// * `Err(BackendError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, BackendError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, BackendError>;

    /// Create an index.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(BackendError::IndexAlreadyExists)` - If another actor created it first
    /// * `Err(BackendError)` - If creation fails
    async fn create_index(&self, index: &str) -> Result<(), BackendError>;

    /// Apply the mapping for a document type.
    ///
    /// # Arguments
    ///
    /// * `index` - The index holding the type
    /// * `doc_type` - The document type the mapping describes
    /// * `mapping` - The mapping source, as structured text
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the mapping was applied
    /// * `Err(BackendError::MappingParseError)` - If the backend rejected the mapping syntax
    /// * `Err(BackendError)` - If the mapping could not be applied
    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &str,
    ) -> Result<(), BackendError>;

    /// Index a single document, replacing any document with the same key.
    async fn index_document(&self, item: &IndexItem) -> Result<(), BackendError>;

    /// Index several documents in one round trip.
    ///
    /// # Arguments
    ///
    /// * `items` - Documents in submission order
    /// * `refresh` - Make the batch visible to reads before returning
    ///
    /// # Returns
    ///
    /// * `Ok(outcomes)` - One outcome per item, `position` matching its offset in `items`
    /// * `Err(BackendError)` - If the round trip itself fails
    async fn bulk_index(
        &self,
        items: &[IndexItem],
        refresh: bool,
    ) -> Result<Vec<BulkItemOutcome>, BackendError>;

    /// Execute a search query.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, BackendError>;

    /// Release the connection. Further calls on the handle are not expected.
    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Acquires backend connections for `SearchIndex::start`.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Open a new connection to the backend.
    async fn connect(&self) -> Result<Arc<dyn SearchBackend>, BackendError>;
}
