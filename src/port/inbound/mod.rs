//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`intent`]: The command and query-intent enumeration the CLI dispatches.

pub mod intent;

pub use intent::{Command, FollowerOrder, Intent, SalesQuery, ZoneScope};
