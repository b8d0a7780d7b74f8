//! In-process store implementations.
//!
//! Each store keeps its data behind a `parking_lot::Mutex` and honours the
//! native semantics the projectors and query adapters rely on. An
//! availability switch lets callers simulate a store going away.

mod column;
mod document;
mod graph;

use std::sync::atomic::{AtomicBool, Ordering};

pub use column::InMemoryColumnStore;
pub use document::InMemoryDocumentStore;
pub use graph::InMemoryGraphStore;

use crate::domain::StoreKind;
use crate::error::StoreError;

#[derive(Debug)]
struct Availability {
    store: StoreKind,
    up: AtomicBool,
}

impl Availability {
    const fn new(store: StoreKind) -> Self {
        Self {
            store,
            up: AtomicBool::new(true),
        }
    }

    fn set(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.up.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable(self.store, "connection refused"))
        }
    }
}
