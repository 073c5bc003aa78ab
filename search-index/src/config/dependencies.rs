//! Dependency initialization and wiring for the provisioning binary.

use std::fs;

use tracing::{error, info};

use crate::config::{MappingSpec, Settings};
use crate::IndexingError;
use search_index_repository::{
    FileMappingLoader, OpenSearchConfig, OpenSearchConnector, SearchIndex, SearchIndexConfig,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The search index facade, not yet started.
    pub search_index: SearchIndex,
    /// Mappings to apply, in declaration order.
    pub mappings: Vec<MappingSpec>,
}

impl Dependencies {
    /// Wire an OpenSearch-backed `SearchIndex` from `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError::ConfigError)` - If mappings are declared but the mapping directory is unusable
    pub fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            mapping_dir = %settings.mapping_dir.display(),
            mappings = settings.mappings.len(),
            "Initializing dependencies"
        );

        if !settings.mappings.is_empty() {
            let metadata = fs::metadata(&settings.mapping_dir).map_err(|e| {
                IndexingError::config(format!(
                    "Mapping directory {} is unusable: {}",
                    settings.mapping_dir.display(),
                    e
                ))
            })?;
            if !metadata.is_dir() {
                return Err(IndexingError::config(format!(
                    "Mapping directory {} is not a directory",
                    settings.mapping_dir.display()
                )));
            }
        }

        let connector = OpenSearchConnector::new(
            OpenSearchConfig::new(settings.opensearch_url.clone())
                .with_index_settings(settings.index_settings.clone()),
        );
        let loader = FileMappingLoader::new(settings.mapping_dir.clone());
        let config = SearchIndexConfig {
            refresh_on_bulk: settings.refresh_on_bulk,
            ..SearchIndexConfig::default()
        };

        Ok(Self {
            search_index: SearchIndex::with_config(Box::new(connector), Box::new(loader), config),
            mappings: settings.mappings.clone(),
        })
    }

    /// Start the search index, apply every mapping, then stop.
    ///
    /// The index is stopped whether or not provisioning succeeds.
    pub async fn run(&self) -> Result<(), IndexingError> {
        self.search_index.start().await?;

        let result = self.provision().await;
        self.search_index.stop().await;
        result
    }

    /// Register and apply every declared mapping, stopping at the first failure.
    pub async fn provision(&self) -> Result<(), IndexingError> {
        for spec in &self.mappings {
            self.search_index
                .register_mapping(&spec.index, &spec.doc_type, &spec.resource)
                .await?;

            if let Err(e) = self
                .search_index
                .ensure_mapping(&spec.index, &spec.doc_type, &spec.resource)
                .await
            {
                error!(mapping = %spec, error = %e, "Failed to provision mapping");
                return Err(e.into());
            }
        }

        info!(count = self.mappings.len(), "Mappings provisioned");
        Ok(())
    }
}
