//! Result types for bulk write operations.

use search_index_shared::DocumentKey;

use crate::errors::BackendError;

/// Status of one item within a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkItemStatus {
    /// The backend stored the item.
    Success,
    /// The backend rejected the item.
    Failure { reason: String },
}

/// Per-item outcome reported by the backend for a bulk request.
///
/// `position` is the item's offset in the submitted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemOutcome {
    /// Offset of the item in the submitted batch.
    pub position: usize,
    /// Whether the item was stored.
    pub status: BulkItemStatus,
}

impl BulkItemOutcome {
    /// Create a successful outcome.
    pub fn success(position: usize) -> Self {
        Self {
            position,
            status: BulkItemStatus::Success,
        }
    }

    /// Create a failed outcome.
    pub fn failure(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            status: BulkItemStatus::Failure {
                reason: reason.into(),
            },
        }
    }

    /// Whether the backend rejected the item.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, BulkItemStatus::Failure { .. })
    }
}

/// An item that failed in the bulk request and again in its single retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualFailure {
    /// Offset of the item in the submitted batch.
    pub position: usize,
    /// The document that could not be written.
    pub key: DocumentKey,
    /// The error reported by the retry.
    pub error: BackendError,
}

/// Outcome of a bulk write.
///
/// Bulk writes never raise write-path failures; callers inspect this value and
/// choose their own escalation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkWriteOutcome {
    /// Every item was stored by the bulk request.
    AllSucceeded { total: usize },

    /// Some items were rejected and retried individually once.
    PartiallyFailed {
        total: usize,
        /// Positions the backend reported as failed, in submission order.
        positions: Vec<usize>,
        /// Failed positions whose retry succeeded.
        recovered: Vec<usize>,
        /// Failed positions whose retry failed too.
        residual: Vec<ResidualFailure>,
    },

    /// The bulk round trip failed; no item-level outcome is known.
    TransportFailed { total: usize, reason: String },
}

impl BulkWriteOutcome {
    /// Number of items submitted.
    pub fn total(&self) -> usize {
        match self {
            Self::AllSucceeded { total }
            | Self::PartiallyFailed { total, .. }
            | Self::TransportFailed { total, .. } => *total,
        }
    }

    /// Whether every item is known to be stored, after retries.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::AllSucceeded { .. } => true,
            Self::PartiallyFailed { residual, .. } => residual.is_empty(),
            Self::TransportFailed { .. } => false,
        }
    }

    /// Items that could not be written even after their retry.
    pub fn residual_failures(&self) -> &[ResidualFailure] {
        match self {
            Self::PartiallyFailed { residual, .. } => residual,
            _ => &[],
        }
    }
}
