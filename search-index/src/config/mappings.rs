//! Parsing of `index/type=resource` mapping declarations.

use std::fmt;

use crate::IndexingError;

/// A mapping resource to apply to one `(index, doc_type)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSpec {
    pub index: String,
    pub doc_type: String,
    /// Resource path, resolved by the mapping loader.
    pub resource: String,
}

impl fmt::Display for MappingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}={}", self.index, self.doc_type, self.resource)
    }
}

/// Parse a comma-separated list of `index/type=resource` entries.
///
/// Blank entries are skipped, so an empty string yields no specs.
pub fn parse_mapping_specs(raw: &str) -> Result<Vec<MappingSpec>, IndexingError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<MappingSpec, IndexingError> {
    let invalid = || {
        IndexingError::config(format!(
            "Invalid mapping entry '{}', expected index/type=resource",
            entry
        ))
    };

    let (pair, resource) = entry.split_once('=').ok_or_else(invalid)?;
    let (index, doc_type) = pair.split_once('/').ok_or_else(invalid)?;

    let (index, doc_type, resource) = (index.trim(), doc_type.trim(), resource.trim());
    if index.is_empty() || doc_type.is_empty() || resource.is_empty() {
        return Err(invalid());
    }

    Ok(MappingSpec {
        index: index.to_string(),
        doc_type: doc_type.to_string(),
        resource: resource.to_string(),
    })
}
