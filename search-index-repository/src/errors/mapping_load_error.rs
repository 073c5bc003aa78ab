//! Mapping load error types.
//!
//! This module defines the errors raised while resolving mapping resources.

use std::io;

use thiserror::Error;

/// Errors raised while resolving a mapping resource. Never retried.
#[derive(Error, Debug)]
pub enum MappingLoadError {
    /// No resource exists at the given path.
    #[error("Could not load nonexistent mapping resource at {0}")]
    NotFound(String),

    /// The resource exists but could not be read.
    #[error("Problem loading mapping resource at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The resource content is not a JSON object.
    #[error("Malformed mapping resource at {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl MappingLoadError {
    /// Create a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a malformed content error.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
