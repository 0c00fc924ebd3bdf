//! Fleet simulator
//!
//! Spawns a set of simulated devices that sample environmental readings and
//! upload them in batches to the telemetry server until interrupted.

use std::sync::Arc;

use clap::Parser;
use demo_fleet::config::{FleetArgs, FleetConfig};
use demo_fleet::device::spawn_fleet;
use demo_fleet::dispatcher::HttpDispatcher;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FleetConfig::try_from(FleetArgs::parse())?;

    init_tracing(&config.log_level);

    info!(
        devices = config.num_devices,
        interval = ?config.sample_interval,
        batch = ?config.batch_interval,
        api = %config.api_url,
        timeout = ?config.request_timeout,
        "Fleet configuration loaded"
    );

    let dispatcher = Arc::new(HttpDispatcher::new(&config.api_url, config.request_timeout)?);
    let devices = spawn_fleet(config.num_devices, config.device_config(), dispatcher);

    info!(devices = devices.len(), "Fleet running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, unsent samples are discarded");
    for device in devices {
        device.abort();
    }

    Ok(())
}
