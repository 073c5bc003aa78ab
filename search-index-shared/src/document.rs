//! Document identity and index items.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a document type within an index.
///
/// Mappings are provisioned per `TypeKey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    /// The index name.
    pub index: String,
    /// The document type within the index.
    pub doc_type: String,
}

impl TypeKey {
    /// Create a new type key.
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.doc_type)
    }
}

/// Uniquely identifies a document: `(index, doc_type, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    /// The index name.
    pub index: String,
    /// The document type within the index.
    pub doc_type: String,
    /// The document identifier, unique within its type.
    pub id: String,
}

impl DocumentKey {
    /// Create a new document key.
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    /// The `(index, doc_type)` pair this document belongs to.
    pub fn type_key(&self) -> TypeKey {
        TypeKey::new(self.index.clone(), self.doc_type.clone())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.doc_type, self.id)
    }
}

/// A document to be written to the search index.
///
/// The payload is an opaque serialized document. Writing the same key twice
/// replaces the earlier payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexItem {
    /// Where the document is written.
    pub key: DocumentKey,
    /// The serialized document body.
    pub payload: Vec<u8>,
}

impl IndexItem {
    /// Create an item from raw payload bytes.
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            key: DocumentKey::new(index, doc_type, id),
            payload: payload.into(),
        }
    }

    /// Create an item by serializing `document` as JSON.
    pub fn json<T: Serialize>(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        document: &T,
    ) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(document)?;
        Ok(Self::new(index, doc_type, id, payload))
    }

    /// The `(index, doc_type)` pair this item is written to.
    pub fn type_key(&self) -> TypeKey {
        self.key.type_key()
    }
}
