use crate::errors::MappingLoadError;

/// Resolves a mapping resource path to its structured-text content.
pub trait MappingLoader: Send + Sync {
    /// Load the mapping stored at `resource`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The mapping source
    /// * `Err(MappingLoadError::NotFound)` - If nothing exists at `resource`
    /// * `Err(MappingLoadError)` - If the resource is unreadable or malformed
    fn load(&self, resource: &str) -> Result<String, MappingLoadError>;
}
