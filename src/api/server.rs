//! HTTP API Server
//!
//! Axum-based HTTP server for the preview API.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use super::handlers::AppState;
use super::routes::create_router;
use crate::error::FlipifyError;

/// HTTP API server
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run the HTTP server until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<(), FlipifyError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.listen_addr;
        let app = create_router(self.state);

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            FlipifyError::Internal(format!("Failed to bind HTTP server to {}: {}", addr, e))
        })?;

        info!("HTTP API server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| FlipifyError::Internal(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}
