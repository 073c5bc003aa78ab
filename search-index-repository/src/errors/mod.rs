//! Error types for the search index repository.

mod backend_error;
mod mapping_load_error;
mod search_index_error;

pub use backend_error::BackendError;
pub use mapping_load_error::MappingLoadError;
pub use search_index_error::SearchIndexError;
