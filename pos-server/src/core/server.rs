//! Server Implementation
//!
//! HTTP listener startup and graceful shutdown

use tokio::net::TcpListener;

use crate::api::build_app;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn new(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

        tracing::info!(
            backend = self.state.printer.backend_name(),
            "🖨️ Printer middleware running on {}",
            addr
        );

        let app = build_app(self.state);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down...");
}
