//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port
//! and storage backend.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes;
use crate::store::{self, MetricStore, StoreResult};

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance over an already opened store
    pub fn new(config: ServerConfig, store: Arc<dyn MetricStore>) -> Self {
        let config = Arc::new(config);
        let router = routes::build_router(store);

        Self { config, router }
    }

    /// Open the configured store and build the server around it
    pub async fn connect(config: ServerConfig) -> StoreResult<Self> {
        let store = store::open(&config).await?;
        tracing::info!(backend = store.backend(), "Metric store ready");
        Ok(Self::new(config, store))
    }

    /// Get the address the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Run the server until Ctrl-C
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server with a specific listener
    ///
    /// Tests bind port 0 to get a random available port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Bind port 0, serve in a background task and return the bound address
    #[cfg(test)]
    pub async fn spawn_test_server(
        config: ServerConfig,
        store: Arc<dyn MetricStore>,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::new(config, store);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        (addr, handle)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
