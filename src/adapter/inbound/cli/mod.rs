//! CLI module graph.
//!
//! Handlers return `Ok(false)` when the command ran but its check failed,
//! so the binary can exit non-zero without treating it as an error.

pub mod check;
pub mod command;
pub mod config;
pub mod cycle;
pub mod output;
pub mod report;
