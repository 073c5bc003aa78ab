//! Configuration types for the SearchIndex.

/// Configuration for the SearchIndex.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Ask the backend to refresh after each bulk request so that subsequent
    /// reads observe the batch.
    pub refresh_on_bulk: bool,
    /// Provision registered mappings before the first write touching their
    /// `(index, doc_type)` pair.
    pub lazy_provisioning: bool,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            refresh_on_bulk: true,
            lazy_provisioning: true,
        }
    }
}

impl SearchIndexConfig {
    /// Create a config that leaves refresh scheduling to the backend.
    pub fn without_refresh() -> Self {
        Self {
            refresh_on_bulk: false,
            ..Self::default()
        }
    }

    /// Set whether registered mappings are provisioned lazily.
    pub fn with_lazy_provisioning(mut self, enabled: bool) -> Self {
        self.lazy_provisioning = enabled;
        self
    }
}
