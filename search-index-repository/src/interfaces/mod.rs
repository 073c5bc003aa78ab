//! Interface definitions for the search backend and mapping resources.
//!
//! This module defines the abstract `SearchBackend` and `MappingLoader` traits
//! that allow for dependency injection and swappable implementations.

mod mapping_loader;
mod search_backend;

pub use mapping_loader::MappingLoader;
pub use search_backend::{BackendConnector, SearchBackend};
