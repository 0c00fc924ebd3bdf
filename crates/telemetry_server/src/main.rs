//! Telemetry Server
//!
//! REST API that ingests device metric batches and serves per-asset series.

use clap::Parser;
use std::path::PathBuf;
use telemetry_server::config::{build_config, CliArgs as ConfigCliArgs};
use telemetry_server::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Telemetry Server - ingestion and query API for asset metrics
#[derive(Parser, Debug)]
#[command(name = "telemetry_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database URI
    #[arg(long, env = "DBURI")]
    dburi: Option<String>,

    /// Storage backend (postgres, memory)
    #[arg(long, env = "TELEMETRY_STORAGE")]
    storage: Option<String>,

    /// Host address to bind to
    #[arg(long, env = "TELEMETRY_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TELEMETRY_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TELEMETRY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            db_uri: args.dburi,
            storage: args.storage,
        }
    }
}

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
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Telemetry Server v{}", telemetry_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        storage = %config.storage,
        db_uri = %config.redacted_db_uri(),
        "Server configuration loaded"
    );

    let server = Server::connect(config).await?;
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
