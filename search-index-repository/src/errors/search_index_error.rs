//! Search index error types.
//!
//! This module defines the errors surfaced to callers of `SearchIndex`.

use search_index_shared::{DocumentKey, TypeKey};
use thiserror::Error;

use super::{BackendError, MappingLoadError};

/// Errors that can occur during search index operations.
#[derive(Debug, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., empty identifiers).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An operation needing the backend was called before `start`.
    #[error("Search index is not started")]
    NotStarted,

    /// Failed to acquire or verify the backend connection.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The mapping resource could not be loaded.
    #[error(transparent)]
    MappingLoad(#[from] MappingLoadError),

    /// The backend rejected the mapping as invalid.
    #[error("Invalid mapping for {key}: {reason}")]
    InvalidMapping { key: TypeKey, reason: String },

    /// The mapping could not be applied for another reason.
    #[error("Provisioning error for {key}: {source}")]
    ProvisioningError {
        key: TypeKey,
        #[source]
        source: BackendError,
    },

    /// A single-document write failed.
    #[error("Write error for {key}: {source}")]
    WriteError {
        key: DocumentKey,
        #[source]
        source: BackendError,
    },

    /// Query execution failed.
    #[error("Query error: {0}")]
    QueryError(#[source] BackendError),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an invalid mapping error.
    pub fn invalid_mapping(key: &TypeKey, reason: impl Into<String>) -> Self {
        Self::InvalidMapping {
            key: key.clone(),
            reason: reason.into(),
        }
    }

    /// Create a provisioning error.
    pub fn provisioning(key: &TypeKey, source: BackendError) -> Self {
        Self::ProvisioningError {
            key: key.clone(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(key: &DocumentKey, source: BackendError) -> Self {
        Self::WriteError {
            key: key.clone(),
            source,
        }
    }

    /// Whether this error reports the target index as absent.
    pub fn is_index_not_found(&self) -> bool {
        match self {
            Self::WriteError { source, .. } | Self::ProvisioningError { source, .. } => {
                source.is_index_not_found()
            }
            _ => false,
        }
    }
}
