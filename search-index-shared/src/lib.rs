//! # Search Index Shared
//!
//! Data types shared between the search index repository and the binaries
//! built on top of it: document identity, index items, and the query and
//! response shapes exchanged with the search backend.

mod document;
mod query;
mod utils;

pub use document::{DocumentKey, IndexItem, TypeKey};
pub use query::{SearchHit, SearchQuery, SearchResponse};
pub use utils::group_by;
