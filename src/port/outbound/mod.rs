//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! One contract per storage engine. Each carries its own native payload
//! vocabulary so that projectors and query adapters speak the store's
//! language while staying independent of any particular driver.

pub mod column;
pub mod document;
pub mod graph;

pub use column::ColumnStore;
pub use document::DocumentStore;
pub use graph::GraphStore;
