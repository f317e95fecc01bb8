//! # flipify
//!
//! Upload a PDF over HTTP, rasterise every page, and serve the pages back as
//! PNG previews.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /api/upload
//!  │
//!  ├─ 1. Validate  "file" part present, named, allowed extension
//!  ├─ 2. Store     <root>/<id>.pdf under a freshly reserved identifier
//!  ├─ 3. Render    rasterise pages at 2x via pdfium (spawn_blocking)
//!  ├─ 4. Encode    drop alpha, PNG-encode into a staging directory
//!  └─ 5. Publish   rename staging to <root>/<id>/, answer with preview URLs
//!
//! GET /api/preview/<id>/page_<n>.png  ──▶  bytes from the storage root
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flipify::{AppState, HttpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder().storage_root("./uploads").build()?;
//!     let state = AppState::from_config(config)?;
//!     HttpServer::new(state)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flipify` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{create_router, AppState, HttpServer};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use convert::{rasterize_upload, ConversionOutput};
pub use error::{FlipifyError, PreviewError, RasterError, UploadError};
pub use naming::UploadId;
pub use pipeline::render::{PageRasterizer, PageSink, PdfiumRasterizer, RenderedPage};
pub use progress::{ConversionProgressCallback, LoggingProgress, NoopProgressCallback, ProgressCallback};
pub use storage::{Storage, StoredDocument};
