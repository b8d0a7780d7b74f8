//! In-memory document store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::Availability;
use crate::domain::StoreKind;
use crate::error::StoreError;
use crate::port::outbound::document::{
    Document, DocumentStore, Filter, FindOptions, IndexSpec, Pipeline, SortKey, SortOrder, Stage,
};

#[derive(Debug, Default)]
struct DocumentState {
    collections: BTreeMap<String, Vec<Document>>,
    indexes: BTreeMap<String, Vec<IndexSpec>>,
}

impl DocumentState {
    fn documents(&self, collection: &str) -> &[Document] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn run(&self, mut docs: Vec<Document>, stages: &[Stage]) -> Vec<Document> {
        for stage in stages {
            docs = match stage {
                Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
                Stage::Sort(keys) => {
                    sort_documents(&mut docs, keys);
                    docs
                }
                Stage::Limit(n) => {
                    docs.truncate(*n);
                    docs
                }
                Stage::Lookup {
                    from,
                    local_field,
                    foreign_field,
                    pipeline,
                    as_field,
                } => docs
                    .into_iter()
                    .map(|mut doc| {
                        let local = doc.get(local_field).cloned().unwrap_or(Value::Null);
                        let joined: Vec<Document> = self
                            .documents(from)
                            .iter()
                            .filter(|f| f.get(foreign_field).unwrap_or(&Value::Null) == &local)
                            .cloned()
                            .collect();
                        let joined = self.run(joined, pipeline);
                        doc.insert(
                            as_field.clone(),
                            Value::Array(joined.into_iter().map(Value::Object).collect()),
                        );
                        doc
                    })
                    .collect(),
            };
        }
        docs
    }
}

/// Total order over JSON values: missing/null, then booleans, numbers,
/// strings, and everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Stable multi-key sort; equal keys keep insertion order.
fn sort_documents(docs: &mut [Document], keys: &[SortKey]) {
    docs.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ordering = compare_values(a.get(&key.field), b.get(&key.field));
                match key.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Document store held in process memory.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    state: Mutex<DocumentState>,
    availability: Availability,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DocumentState::default()),
            availability: Availability::new(StoreKind::Document),
        }
    }

    /// Simulate the store becoming reachable or unreachable.
    pub fn set_available(&self, up: bool) {
        self.availability.set(up);
    }

    /// Names of the indexes defined on a collection.
    #[must_use]
    pub fn index_names(&self, collection: &str) -> Vec<String> {
        self.state
            .lock()
            .indexes
            .get(collection)
            .map(|specs| specs.iter().map(IndexSpec::name).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_many(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<u64, StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents.iter().cloned());
        Ok(documents.len() as u64)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.availability.check()?;
        let state = self.state.lock();
        let mut docs: Vec<Document> = state
            .documents(collection)
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        sort_documents(&mut docs, &options.sort);
        if let Some(limit) = options.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        self.availability.check()?;
        let state = self.state.lock();
        let docs = state.documents(collection).to_vec();
        Ok(state.run(docs, &pipeline.0))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();
        let Some(docs) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();
        let specs = state.indexes.entry(collection.to_string()).or_default();
        if !specs.contains(index) {
            specs.push(index.clone());
        }
        Ok(index.name())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.availability.check()?;
        let state = self.state.lock();
        Ok(state
            .documents(collection)
            .iter()
            .filter(|d| filter.matches(d))
            .count() as u64)
    }
}
