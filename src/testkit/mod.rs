//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`fixtures`] - A small canonical dataset, linked with a seeded RNG, plus
//!   matching CSV inputs.
//! - [`stores`] - In-memory stores bundled as injectable handles, optionally
//!   preloaded with a fixture.

pub mod fixtures;
pub mod stores;
