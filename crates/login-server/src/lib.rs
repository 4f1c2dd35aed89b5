//! # login-server
//!
//! HTTP server for the hosted login service.
//!
//! The server orchestrates the authentication flow over the remote
//! identity backend: it resolves inbound authorization requests against
//! the browser's sessions and answers with redirects to the next step or
//! with JSON errors. It renders no pages.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use login_client::HttpBackend;
use login_store::MemoryStore;
use tokio::net::TcpListener;

/// The hosted login server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a server instance over the configured identity backend.
    ///
    /// ## Errors
    ///
    /// Fails when the backend API URL is invalid.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&config.api_url, config.api_token.clone())
            .map_err(|e| anyhow::anyhow!("backend client: {e}"))?;
        let store = MemoryStore::new();
        let state = AppState::new(config, Arc::new(backend), Arc::new(store));
        Ok(Self { state })
    }

    /// Runs the server until a shutdown signal arrives.
    ///
    /// ## Errors
    ///
    /// Fails when the listen address cannot be bound.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!(
            "{}:{}",
            self.state.config.host, self.state.config.port
        )
        .parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("server listening on http://{addr}");

        let app = create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }

    /// Creates the router without starting the server, for tests.
    #[must_use]
    pub fn test_router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
