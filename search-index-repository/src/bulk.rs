//! Bulk document writes with single-retry recovery of rejected items.
//!
//! A batch goes to the backend as one request. Items the backend rejects are
//! retried once each, sequentially and in submission order, through
//! `DocumentWriter::put`. Nothing here raises: failures that survive the
//! retry, and failures of the round trip itself, are logged and reported in
//! the returned `BulkWriteOutcome`.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::errors::{BackendError, SearchIndexError};
use crate::interfaces::SearchBackend;
use crate::types::{BulkItemOutcome, BulkWriteOutcome, ResidualFailure};
use crate::writer::DocumentWriter;
use search_index_shared::IndexItem;

/// Writes batches of documents in one round trip.
pub struct BulkWriter {
    backend: Arc<dyn SearchBackend>,
    writer: DocumentWriter,
    refresh: bool,
}

impl BulkWriter {
    /// Create a bulk writer on an opened backend handle.
    ///
    /// With `refresh` set, the backend makes each batch visible to reads
    /// before acknowledging it.
    pub fn new(backend: Arc<dyn SearchBackend>, refresh: bool) -> Self {
        Self {
            writer: DocumentWriter::new(backend.clone()),
            backend,
            refresh,
        }
    }

    /// Write `items` in one bulk request, retrying rejected items once.
    ///
    /// An empty batch makes no backend call.
    #[instrument(skip(self, items), fields(total = items.len()))]
    pub async fn bulk_put(&self, items: &[IndexItem]) -> BulkWriteOutcome {
        let total = items.len();
        if items.is_empty() {
            return BulkWriteOutcome::AllSucceeded { total };
        }

        let outcomes = match self.backend.bulk_index(items, self.refresh).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!(error = %e, total, "Execution of bulk operation failed");
                return BulkWriteOutcome::TransportFailed {
                    total,
                    reason: e.to_string(),
                };
            }
        };

        let positions = failed_positions(&outcomes, total);
        if positions.is_empty() {
            debug!(total, "Bulk operation succeeded");
            return BulkWriteOutcome::AllSucceeded { total };
        }

        info!(
            total,
            failed = positions.len(),
            "Bulk operation had failures, retrying failed items individually"
        );

        let mut recovered = Vec::new();
        let mut residual = Vec::new();

        for &position in &positions {
            let item = &items[position];
            match self.writer.put(item).await {
                Ok(()) => recovered.push(position),
                Err(SearchIndexError::WriteError { key, source }) => {
                    error!(position, key = %key, error = %source, "Retry of failed bulk item failed");
                    residual.push(ResidualFailure {
                        position,
                        key,
                        error: source,
                    });
                }
                Err(e) => {
                    error!(position, key = %item.key, error = %e, "Retry of failed bulk item failed");
                    residual.push(ResidualFailure {
                        position,
                        key: item.key.clone(),
                        error: BackendError::index(e.to_string()),
                    });
                }
            }
        }

        BulkWriteOutcome::PartiallyFailed {
            total,
            positions,
            recovered,
            residual,
        }
    }
}

/// Positions the backend reported as failed, sorted and deduplicated.
///
/// Outcomes outside `0..total` cannot be matched to a submitted item and are
/// dropped.
fn failed_positions(outcomes: &[BulkItemOutcome], total: usize) -> Vec<usize> {
    if outcomes.len() != total {
        warn!(
            expected = total,
            received = outcomes.len(),
            "Bulk response item count does not match the submitted batch"
        );
    }

    let mut positions: Vec<usize> = outcomes
        .iter()
        .filter(|outcome| outcome.is_failure())
        .filter_map(|outcome| {
            if outcome.position < total {
                Some(outcome.position)
            } else {
                warn!(
                    position = outcome.position,
                    total, "Ignoring bulk outcome outside the submitted batch"
                );
                None
            }
        })
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}
