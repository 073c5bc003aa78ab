//! Schema provisioning.
//!
//! Ensures an index exists and a type's mapping is applied before documents
//! of that type are written. Provisioning is idempotent: the existence check
//! short-circuits index creation, and losing a creation race to another
//! actor is logged and tolerated.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::errors::{BackendError, SearchIndexError};
use crate::interfaces::SearchBackend;
use search_index_shared::TypeKey;

/// Applies mappings and remembers which `(index, doc_type)` pairs are done.
#[derive(Debug, Default)]
pub struct SchemaProvisioner {
    provisioned: Mutex<HashSet<TypeKey>>,
}

impl SchemaProvisioner {
    /// Create a provisioner with nothing provisioned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `key.index` exists and apply `mapping` for `key.doc_type`.
    ///
    /// Errors while checking for or creating the index are logged and do not
    /// stop provisioning; the mapping step reports whether the index is
    /// actually usable.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the mapping is applied
    /// * `Err(SearchIndexError::InvalidMapping)` - If the backend rejected the mapping syntax
    /// * `Err(SearchIndexError::ProvisioningError)` - If the mapping could not be applied
    pub async fn ensure_mapping(
        &self,
        backend: &dyn SearchBackend,
        key: &TypeKey,
        mapping: &str,
    ) -> Result<(), SearchIndexError> {
        self.ensure_index(backend, &key.index).await;

        match backend.put_mapping(&key.index, &key.doc_type, mapping).await {
            Ok(()) => {}
            Err(BackendError::MappingParseError(reason)) => {
                error!(key = %key, reason = %reason, "Invalid mapping");
                return Err(SearchIndexError::invalid_mapping(key, reason));
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to apply mapping");
                return Err(SearchIndexError::provisioning(key, e));
            }
        }

        self.provisioned.lock().await.insert(key.clone());
        info!(index = %key.index, doc_type = %key.doc_type, "Mapping applied");
        Ok(())
    }

    /// Whether a mapping has been applied for `key` by this provisioner.
    pub async fn is_provisioned(&self, key: &TypeKey) -> bool {
        self.provisioned.lock().await.contains(key)
    }

    /// Forget every pair of `index`, so they are provisioned again.
    ///
    /// Called when the backend reports the index absent.
    pub async fn forget_index(&self, index: &str) {
        let mut provisioned = self.provisioned.lock().await;
        let before = provisioned.len();
        provisioned.retain(|key| key.index != index);
        if provisioned.len() != before {
            warn!(index = %index, "Index reported absent, mappings will be provisioned again");
        }
    }

    async fn ensure_index(&self, backend: &dyn SearchBackend, index: &str) {
        match backend.index_exists(index).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                error!(index = %index, error = %e, "While checking for index existence");
                return;
            }
        }

        match backend.create_index(index).await {
            Ok(()) => info!(index = %index, "Index created"),
            Err(BackendError::IndexAlreadyExists(_)) => {
                warn!(index = %index, "Index was created concurrently by another actor");
            }
            Err(e) => error!(index = %index, error = %e, "While creating index"),
        }
    }
}
