//! Web server for sharefront.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::ServerConfig;
use crate::{Result, SharefrontError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// HTTP server for the file share front-end.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, app_state: Arc<AppState>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                SharefrontError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self { addr, app_state })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn app(self) -> Router {
        create_router(self.app_state)
            .merge(create_health_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.app();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.app();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
