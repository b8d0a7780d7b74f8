//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!      CLI ─────────▶│  Intent / Command       │
//!                    │  (application layer)    │
//!                    └───────────┬─────────────┘
//!              ┌─────────────────┼─────────────────┐
//!              ▼                 ▼                 ▼
//!        ┌───────────┐    ┌─────────────┐   ┌─────────────┐
//!        │GraphStore │    │DocumentStore│   │ ColumnStore │
//!        └───────────┘    └─────────────┘   └─────────────┘
//! ```

pub mod inbound;
pub mod outbound;

pub use outbound::{ColumnStore, DocumentStore, GraphStore};
