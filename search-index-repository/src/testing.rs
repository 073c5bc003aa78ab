//! Mock backend shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::interfaces::{BackendConnector, SearchBackend};
use crate::types::BulkItemOutcome;
use search_index_shared::{DocumentKey, IndexItem, SearchHit, SearchQuery, SearchResponse};

/// A call received by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    HealthCheck,
    IndexExists(String),
    CreateIndex(String),
    PutMapping(String, String),
    IndexDocument(DocumentKey),
    Bulk { ids: Vec<String>, refresh: bool },
    Search(String),
    Close,
}

/// In-memory backend recording every call, with failure injection.
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<Call>>,
    pub indices: Mutex<HashSet<String>>,
    pub mappings: Mutex<HashMap<(String, String), String>>,
    pub documents: Mutex<HashMap<DocumentKey, Vec<u8>>>,
    /// Positions the next bulk request rejects.
    pub bulk_failures: Mutex<HashSet<usize>>,
    /// Document ids every single-document write rejects.
    pub put_failures: Mutex<HashSet<String>>,
    /// Report the index absent on single-document writes to these ids.
    pub put_index_missing: Mutex<HashSet<String>>,
    pub bulk_transport_failure: Mutex<Option<BackendError>>,
    /// `index_exists` answers false once, then `create_index` loses a race.
    pub lose_creation_race: Mutex<bool>,
    pub exists_failure: Mutex<Option<BackendError>>,
    pub mapping_failure: Mutex<Option<BackendError>>,
    pub unhealthy: Mutex<bool>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_index(self: Arc<Self>, index: &str) -> Arc<Self> {
        self.indices.lock().unwrap().insert(index.to_string());
        self
    }

    pub fn fail_bulk_positions(&self, positions: &[usize]) {
        self.bulk_failures
            .lock()
            .unwrap()
            .extend(positions.iter().copied());
    }

    pub fn fail_puts_for(&self, ids: &[&str]) {
        self.put_failures
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| id.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn document(&self, index: &str, doc_type: &str, id: &str) -> Option<Vec<u8>> {
        self.documents
            .lock()
            .unwrap()
            .get(&DocumentKey::new(index, doc_type, id))
            .cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store(&self, item: &IndexItem) {
        self.indices.lock().unwrap().insert(item.key.index.clone());
        self.documents
            .lock()
            .unwrap()
            .insert(item.key.clone(), item.payload.clone());
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn health_check(&self) -> Result<bool, BackendError> {
        self.record(Call::HealthCheck);
        Ok(!*self.unhealthy.lock().unwrap())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        self.record(Call::IndexExists(index.to_string()));
        if let Some(err) = self.exists_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if *self.lose_creation_race.lock().unwrap() {
            return Ok(false);
        }
        Ok(self.indices.lock().unwrap().contains(index))
    }

    async fn create_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(Call::CreateIndex(index.to_string()));
        let mut race = self.lose_creation_race.lock().unwrap();
        let mut indices = self.indices.lock().unwrap();
        if *race {
            *race = false;
            indices.insert(index.to_string());
            return Err(BackendError::IndexAlreadyExists(index.to_string()));
        }
        if !indices.insert(index.to_string()) {
            return Err(BackendError::IndexAlreadyExists(index.to_string()));
        }
        Ok(())
    }

    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &str,
    ) -> Result<(), BackendError> {
        self.record(Call::PutMapping(index.to_string(), doc_type.to_string()));
        if let Some(err) = self.mapping_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if !self.indices.lock().unwrap().contains(index) {
            return Err(BackendError::IndexNotFound(index.to_string()));
        }
        self.mappings
            .lock()
            .unwrap()
            .insert((index.to_string(), doc_type.to_string()), mapping.to_string());
        Ok(())
    }

    async fn index_document(&self, item: &IndexItem) -> Result<(), BackendError> {
        self.record(Call::IndexDocument(item.key.clone()));
        if self.put_index_missing.lock().unwrap().contains(&item.key.id) {
            return Err(BackendError::IndexNotFound(item.key.index.clone()));
        }
        if self.put_failures.lock().unwrap().contains(&item.key.id) {
            return Err(BackendError::index(format!("rejected {}", item.key.id)));
        }
        self.store(item);
        Ok(())
    }

    async fn bulk_index(
        &self,
        items: &[IndexItem],
        refresh: bool,
    ) -> Result<Vec<BulkItemOutcome>, BackendError> {
        self.record(Call::Bulk {
            ids: items.iter().map(|item| item.key.id.clone()).collect(),
            refresh,
        });
        if let Some(err) = self.bulk_transport_failure.lock().unwrap().clone() {
            return Err(err);
        }

        let failures = std::mem::take(&mut *self.bulk_failures.lock().unwrap());
        let outcomes = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                if failures.contains(&position) {
                    BulkItemOutcome::failure(position, "es_rejected_execution_exception")
                } else {
                    self.store(item);
                    BulkItemOutcome::success(position)
                }
            })
            .collect();
        Ok(outcomes)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, BackendError> {
        self.record(Call::Search(query.index.clone()));
        if !self.indices.lock().unwrap().contains(&query.index) {
            return Err(BackendError::IndexNotFound(query.index.clone()));
        }

        let documents = self.documents.lock().unwrap();
        let mut hits: Vec<SearchHit> = documents
            .iter()
            .filter(|(key, _)| key.index == query.index)
            .map(|(key, payload)| SearchHit {
                index: key.index.clone(),
                doc_type: Some(key.doc_type.clone()),
                id: key.id.clone(),
                score: Some(1.0),
                source: serde_json::from_slice(payload).unwrap_or_default(),
            })
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(SearchResponse {
            total: hits.len() as u64,
            took_ms: 1,
            hits,
        })
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.record(Call::Close);
        Ok(())
    }
}

/// Connector handing out the same mock backend on every `connect`.
pub struct MockConnector {
    pub backend: Arc<MockBackend>,
    pub refuse: bool,
}

impl MockConnector {
    pub fn new(backend: Arc<MockBackend>) -> Self {
        Self {
            backend,
            refuse: false,
        }
    }
}

#[async_trait]
impl BackendConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn SearchBackend>, BackendError> {
        if self.refuse {
            return Err(BackendError::connection("connection refused"));
        }
        Ok(self.backend.clone())
    }
}

/// A three-item batch of rule documents with ids `r0`, `r1`, `r2`.
pub fn rule_batch() -> Vec<IndexItem> {
    (0..3)
        .map(|n| {
            IndexItem::new(
                "rules",
                "rule",
                format!("r{}", n),
                format!(r#"{{"key": "r{}"}}"#, n),
            )
        })
        .collect()
}
