//! Projection of a linked model into each store's native write payloads.
//!
//! Projectors are pure: they never touch a store. The lifecycle manager hands
//! their output to the store clients.

pub mod column;
pub mod document;
pub mod graph;
