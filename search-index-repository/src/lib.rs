//! # Search Index Repository
//!
//! This crate keeps documents synchronized with the search backend. It
//! provisions index mappings per document type, writes single documents and
//! batches, retries failed batch items individually, and runs queries. It
//! includes definitions for errors and interfaces, and a concrete
//! implementation for OpenSearch.

pub mod bulk;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod mappings;
pub mod opensearch;
pub mod provisioner;
pub mod types;
pub mod writer;

#[cfg(test)]
mod testing;

pub use client::SearchIndex;
pub use config::SearchIndexConfig;
pub use errors::{BackendError, MappingLoadError, SearchIndexError};
pub use interfaces::{BackendConnector, MappingLoader, SearchBackend};
pub use mappings::{FileMappingLoader, StaticMappingLoader};
pub use opensearch::{IndexSettings, OpenSearchBackend, OpenSearchConfig, OpenSearchConnector};
pub use types::{BulkItemOutcome, BulkItemStatus, BulkWriteOutcome, ResidualFailure};
