//! OpenSearch connection and index configuration.

use serde_json::{json, Value};

/// Settings applied to indices created during provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Primary shards per index.
    pub number_of_shards: u32,
    /// Replicas per primary shard.
    pub number_of_replicas: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl IndexSettings {
    /// Create settings with the given shard and replica counts.
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
        }
    }

    /// The body of a create-index request.
    ///
    /// Mappings are not part of it: they are applied per document type once
    /// the index exists.
    pub fn to_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            }
        })
    }
}

/// Configuration for connecting to OpenSearch.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// The OpenSearch server URL (e.g., "http://localhost:9200").
    pub url: String,
    /// Settings for indices created by provisioning.
    pub index_settings: IndexSettings,
}

impl OpenSearchConfig {
    /// Create a config for the server at `url` with default index settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index_settings: IndexSettings::default(),
        }
    }

    /// Set the settings for indices created by provisioning.
    pub fn with_index_settings(mut self, index_settings: IndexSettings) -> Self {
        self.index_settings = index_settings;
        self
    }
}
