//! REST API server for per-asset environmental metrics
//!
//! This crate accepts batches of telemetry samples from simulated devices,
//! stores every sample as a row (all-or-nothing per batch) and serves
//! time-ordered metric series per asset.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod store;

pub use telemetry_core;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
