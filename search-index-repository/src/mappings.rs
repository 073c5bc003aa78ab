//! Mapping resource loaders.
//!
//! `FileMappingLoader` resolves resources under a root directory.
//! `StaticMappingLoader` serves resources held in memory, typically embedded
//! with `include_str!`.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::MappingLoadError;
use crate::interfaces::MappingLoader;

/// Check that `content` is a JSON object, the only shape a mapping can take.
fn validate_mapping_source(resource: &str, content: &str) -> Result<(), MappingLoadError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| MappingLoadError::malformed(resource, e.to_string()))?;

    if !value.is_object() {
        return Err(MappingLoadError::malformed(
            resource,
            "mapping must be a JSON object",
        ));
    }
    Ok(())
}

/// Loads mapping resources from files under a root directory.
///
/// Resource paths are resolved relative to the root; a leading `/` is
/// ignored, so `/rules/rule.json` and `rules/rule.json` name the same file.
#[derive(Debug, Clone)]
pub struct FileMappingLoader {
    root: PathBuf,
}

impl FileMappingLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, resource: &str) -> PathBuf {
        self.root.join(resource.trim_start_matches('/'))
    }
}

impl MappingLoader for FileMappingLoader {
    fn load(&self, resource: &str) -> Result<String, MappingLoadError> {
        let path = self.resolve(resource);

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MappingLoadError::not_found(resource),
            _ => MappingLoadError::Io {
                path: resource.to_string(),
                source: e,
            },
        })?;

        validate_mapping_source(resource, &content)?;

        debug!(resource = %resource, path = %path.display(), "Loaded mapping resource");
        Ok(content)
    }
}

/// Serves mapping resources held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticMappingLoader {
    resources: HashMap<String, String>,
}

impl StaticMappingLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    pub fn with_resource(mut self, resource: impl Into<String>, content: impl Into<String>) -> Self {
        self.resources.insert(resource.into(), content.into());
        self
    }
}

impl MappingLoader for StaticMappingLoader {
    fn load(&self, resource: &str) -> Result<String, MappingLoadError> {
        let content = self
            .resources
            .get(resource)
            .ok_or_else(|| MappingLoadError::not_found(resource))?;

        validate_mapping_source(resource, content)?;
        Ok(content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RULE_MAPPING: &str = r#"{"rule": {"properties": {"key": {"type": "keyword"}}}}"#;

    #[test]
    fn test_file_loader_reads_resource() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("rules")).unwrap();
        fs::write(dir.path().join("rules/rule.json"), RULE_MAPPING).unwrap();

        let loader = FileMappingLoader::new(dir.path());

        assert_eq!(loader.load("/rules/rule.json").unwrap(), RULE_MAPPING);
        assert_eq!(loader.load("rules/rule.json").unwrap(), RULE_MAPPING);
    }

    #[test]
    fn test_file_loader_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileMappingLoader::new(dir.path());

        let err = loader.load("/rules/missing.json").unwrap_err();
        assert!(matches!(err, MappingLoadError::NotFound(ref path) if path == "/rules/missing.json"));
    }

    #[test]
    fn test_file_loader_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("rules")).unwrap();
        let loader = FileMappingLoader::new(dir.path());

        let err = loader.load("rules").unwrap_err();
        assert!(matches!(err, MappingLoadError::Io { .. }));
    }

    #[test]
    fn test_file_loader_malformed_resource() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{\"rule\": ").unwrap();
        let loader = FileMappingLoader::new(dir.path());

        let err = loader.load("broken.json").unwrap_err();
        assert!(matches!(err, MappingLoadError::Malformed { .. }));
    }

    #[test]
    fn test_static_loader() {
        let loader = StaticMappingLoader::new()
            .with_resource("/rules/rule.json", RULE_MAPPING)
            .with_resource("/rules/array.json", "[1, 2]");

        assert_eq!(loader.load("/rules/rule.json").unwrap(), RULE_MAPPING);
        assert!(matches!(
            loader.load("/rules/other.json"),
            Err(MappingLoadError::NotFound(_))
        ));
        assert!(matches!(
            loader.load("/rules/array.json"),
            Err(MappingLoadError::Malformed { .. })
        ));
    }
}
