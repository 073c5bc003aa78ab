//! # Search Index
//!
//! Entry point library for the search index provisioning binary.
//!
//! This crate reads configuration from the environment, wires a
//! `SearchIndex` against OpenSearch, and applies the configured mappings.

pub mod config;
pub mod logging;

pub use config::{Dependencies, MappingSpec, Settings};

use thiserror::Error;

/// Errors that can occur during initialization or provisioning.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] search_index_repository::SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
