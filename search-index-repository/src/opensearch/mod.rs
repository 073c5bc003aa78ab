//! OpenSearch implementation of the search backend.
//!
//! This module provides a concrete implementation of `SearchBackend` and
//! `BackendConnector` using OpenSearch as the backend.

mod client;
mod index_config;
mod responses;

pub use client::{OpenSearchBackend, OpenSearchConnector};
pub use index_config::{IndexSettings, OpenSearchConfig};
pub use responses::TYPE_SEPARATOR;
