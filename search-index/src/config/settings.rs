//! Settings read from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use search_index_repository::IndexSettings;

use crate::config::mappings::{parse_mapping_specs, MappingSpec};
use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default directory mapping resources are resolved against.
const DEFAULT_MAPPING_DIR: &str = "./mappings";

/// Runtime settings for the provisioning binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub opensearch_url: String,
    pub mapping_dir: PathBuf,
    pub mappings: Vec<MappingSpec>,
    pub refresh_on_bulk: bool,
    pub index_settings: IndexSettings,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SEARCH_INDEX_MAPPING_DIR`: Root of mapping resources (default: ./mappings)
    /// - `SEARCH_INDEX_MAPPINGS`: Comma-separated `index/type=resource` entries (default: none)
    /// - `SEARCH_INDEX_REFRESH_ON_BULK`: Refresh after bulk writes (default: true)
    /// - `SEARCH_INDEX_SHARDS`: Shards for created indices (default: 1)
    /// - `SEARCH_INDEX_REPLICAS`: Replicas for created indices (default: 1)
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Parsed settings
    /// * `Err(IndexingError::ConfigError)` - If a variable holds an invalid value
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let mapping_dir = lookup("SEARCH_INDEX_MAPPING_DIR")
            .unwrap_or_else(|| DEFAULT_MAPPING_DIR.to_string());
        let mappings = parse_mapping_specs(&lookup("SEARCH_INDEX_MAPPINGS").unwrap_or_default())?;

        let refresh_on_bulk = match lookup("SEARCH_INDEX_REFRESH_ON_BULK") {
            Some(raw) => parse_bool("SEARCH_INDEX_REFRESH_ON_BULK", &raw)?,
            None => true,
        };

        let defaults = IndexSettings::default();
        let number_of_shards: u32 =
            parse_or("SEARCH_INDEX_SHARDS", &lookup, defaults.number_of_shards)?;
        let number_of_replicas: u32 =
            parse_or("SEARCH_INDEX_REPLICAS", &lookup, defaults.number_of_replicas)?;

        if number_of_shards == 0 {
            return Err(IndexingError::config(
                "SEARCH_INDEX_SHARDS must be at least 1",
            ));
        }

        Ok(Self {
            opensearch_url,
            mapping_dir: PathBuf::from(mapping_dir),
            mappings,
            refresh_on_bulk,
            index_settings: IndexSettings::new(number_of_shards, number_of_replicas),
        })
    }
}

fn parse_or<T, F>(name: &str, lookup: &F, default: T) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {} '{}': {}", name, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, IndexingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(IndexingError::config(format!(
            "Invalid {} '{}', expected true or false",
            name, raw
        ))),
    }
}
