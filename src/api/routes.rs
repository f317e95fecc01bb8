//! HTTP API Route Definitions

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Create the API router with all routes
///
/// Every route accepts cross-origin requests from any origin, and request
/// bodies are capped at `config.max_upload_bytes`.
pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/api/upload", post(handlers::upload_file))
        .route("/api/preview/{*path}", get(handlers::get_preview))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
