//! Query and response types.
//!
//! The query body is passed to the backend untouched. Building queries is the
//! caller's business; this crate only carries them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A query against a single index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The index to search.
    pub index: String,
    /// The query DSL body, sent as-is.
    pub body: Value,
    /// Offset of the first hit to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
    /// Maximum number of hits to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl SearchQuery {
    /// Create a query with an explicit DSL body.
    pub fn new(index: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            body,
            from: None,
            size: None,
        }
    }

    /// Create a query matching every document in the index.
    pub fn match_all(index: impl Into<String>) -> Self {
        Self::new(index, json!({ "query": { "match_all": {} } }))
    }

    /// Set pagination.
    pub fn with_page(mut self, from: u32, size: u32) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }
}

/// A single hit returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The index the hit came from.
    pub index: String,
    /// The document type, when the backend id carries one.
    pub doc_type: Option<String>,
    /// The document identifier.
    pub id: String,
    /// Relevance score, absent for unscored queries.
    pub score: Option<f64>,
    /// The stored document.
    pub source: Value,
}

/// Results of a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching documents (may exceed `hits.len()`).
    pub total: u64,
    /// Time the backend spent executing the query, in milliseconds.
    pub took_ms: u64,
    /// Hits in backend order.
    pub hits: Vec<SearchHit>,
}
