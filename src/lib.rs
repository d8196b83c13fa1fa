//! Sluice - an asset build pipeline for style sheets and documentation sites.
//!
//! ```text
//! scan ──> Pipeline (stages · partitions · sinks) ──> dist/
//!                ^
//!                └── Orchestrator (watch bindings) ──> live reload clients
//! ```

pub mod asset;
pub mod build;
pub mod cli;
pub mod config;
pub mod core;
pub mod embed;
pub mod logger;
pub mod pipeline;
pub mod reload;
pub mod transform;
pub mod utils;
pub mod watch;
