//! Application services (use cases).
//!
//! Ingest builds the canonical model, the relationship generator links it,
//! projectors turn it into store payloads, and the lifecycle manager and
//! query adapters drive the injected store clients.

pub mod ingest;
pub mod lifecycle;
pub mod projection;
pub mod query;
pub mod relationship;
pub mod service;

pub use ingest::{Ingest, IngestPolicy, LoadReport};
pub use lifecycle::{LoadMode, LoadSummary, StoreLifecycle, StoreOutcome, Stores};
pub use query::QueryService;
pub use relationship::generate;
pub use service::{CommandOutcome, Polystore};
