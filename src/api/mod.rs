//! HTTP API
//!
//! Axum router exposing the upload and preview endpoints.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use server::HttpServer;
