//! In-memory store bundles.

use std::sync::Arc;

use super::fixtures;
use crate::adapter::outbound::memory::{
    InMemoryColumnStore, InMemoryDocumentStore, InMemoryGraphStore,
};
use crate::application::lifecycle::{LoadMode, StoreLifecycle, Stores};
use crate::application::projection;
use crate::domain::LinkedModel;

/// Concrete in-memory stores, kept alongside the trait-object handles so
/// tests can flip availability or inspect contents.
#[derive(Debug, Clone)]
pub struct MemoryStores {
    pub graph: Arc<InMemoryGraphStore>,
    pub document: Arc<InMemoryDocumentStore>,
    pub column: Arc<InMemoryColumnStore>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self {
            graph: Arc::new(InMemoryGraphStore::new()),
            document: Arc::new(InMemoryDocumentStore::new()),
            column: Arc::new(InMemoryColumnStore::new()),
        }
    }

    /// The same stores as the handles the application layer takes.
    pub fn handles(&self) -> Stores {
        Stores {
            graph: self.graph.clone(),
            document: self.document.clone(),
            column: self.column.clone(),
        }
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixture model already loaded into fresh stores.
pub struct Loaded {
    pub model: LinkedModel,
    pub memory: MemoryStores,
    pub stores: Stores,
}

/// Link the fixture with `seed` and load it into every store.
pub async fn loaded(seed: u64) -> Loaded {
    let memory = MemoryStores::new();
    let stores = memory.handles();
    let model = fixtures::linked_model(seed);
    let lifecycle = StoreLifecycle::new(
        stores.clone(),
        projection::column::keyspace("polystore", 1),
        LoadMode::RejectIfNonEmpty,
    );
    let summary = lifecycle.load_everywhere(&model).await;
    assert!(summary.is_success(), "fixture load failed: {summary:?}");
    Loaded {
        model,
        memory,
        stores,
    }
}
