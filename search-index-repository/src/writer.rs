//! Single-document writes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchBackend;
use search_index_shared::IndexItem;

/// Writes one document per call.
///
/// There is no retry at this layer: a failed `put` is returned to the caller,
/// who decides whether to try again.
pub struct DocumentWriter {
    backend: Arc<dyn SearchBackend>,
}

impl DocumentWriter {
    /// Create a writer on an opened backend handle.
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Upsert a single document, resolving once the backend acknowledges it.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was stored
    /// * `Err(SearchIndexError::WriteError)` - Carrying the document key and backend detail
    pub async fn put(&self, item: &IndexItem) -> Result<(), SearchIndexError> {
        match self.backend.index_document(item).await {
            Ok(()) => {
                debug!(
                    index = %item.key.index,
                    doc_type = %item.key.doc_type,
                    id = %item.key.id,
                    "Document indexed"
                );
                Ok(())
            }
            Err(e) => {
                warn!(key = %item.key, error = %e, "Document write failed");
                Err(SearchIndexError::write(&item.key, e))
            }
        }
    }
}
