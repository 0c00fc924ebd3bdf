//! # Device Fleet
//!
//! Simulated environmental-control devices that feed the telemetry server.
//!
//! Each device runs as its own tokio task with two independent timers: a
//! sampling cadence that appends a snapshot of every tracked quantity to a
//! per-device buffer, and a batching cadence that drains the buffer and ships
//! the batch to the collector, fire and forget.
//!
//! ## Modules
//!
//! - [`signal`]: bounded random-walk generator and the tracked quantities
//! - [`buffer`]: mutex-guarded sample buffer shared by a device's two timers
//! - [`device`]: per-device simulation loop and fleet spawning
//! - [`dispatcher`]: HTTP transport for batches
//! - [`config`]: command-line and environment configuration

pub mod buffer;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod signal;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::buffer::SampleBuffer;
    pub use crate::config::{FleetArgs, FleetConfig};
    pub use crate::device::{spawn_fleet, DeviceConfig, DeviceSimulator};
    pub use crate::dispatcher::{dispatch, Dispatcher, HttpDispatcher};
    pub use crate::signal::{next_value, BoundedRandomWalk, EnvironmentSignals};
}
