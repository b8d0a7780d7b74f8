//! Polystore - one restaurant dataset, three persistence engines.
//!
//! Users, restaurants, zones and monthly sales are read from CSV into a
//! store-agnostic canonical model. A relationship generator links it (zones,
//! follows, followers), and three projectors translate the linked model into
//! the native shapes of a property-graph store, a document store and a
//! wide-column store. Query adapters answer the reporting intents each store
//! is best at.
//!
//! # Architecture
//!
//! - **`domain`** - Canonical entities, months, categories, report shapes
//! - **`port`** - Store client traits (outbound) and the intent enumeration
//!   (inbound)
//! - **`application`** - Ingest, relationship generation, projection, store
//!   lifecycle, query adapters
//! - **`adapter`** - In-memory store implementations and the CLI
//! - **`infrastructure`** - Configuration, logging, wiring
//!
//! # Example
//!
//! ```no_run
//! use polystore::infrastructure::bootstrap;
//! use polystore::infrastructure::config::Config;
//!
//! # async fn demo() -> polystore::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let prepared = bootstrap::prepare_model(&config)?;
//! let service = bootstrap::build_default_service(&config);
//! let summary = service.lifecycle().load_everywhere(&prepared.model).await;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
