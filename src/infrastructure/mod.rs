//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, logging, and wiring the application services
//! to concrete stores.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
