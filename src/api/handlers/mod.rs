//! HTTP API Request Handlers

mod preview;
mod upload;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::FlipifyError;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::progress::{LoggingProgress, ProgressCallback};
use crate::storage::Storage;

/// Shared application state
///
/// Immutable after startup; every request sees the same configuration,
/// storage root and rasterizer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub storage: Storage,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub progress: ProgressCallback,
}

impl AppState {
    pub fn new(config: ServerConfig, storage: Storage, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            rasterizer,
            progress: Arc::new(LoggingProgress),
        }
    }

    /// State backed by pdfium, with the storage root created if missing.
    pub fn from_config(config: ServerConfig) -> Result<Self, FlipifyError> {
        let storage = Storage::open(&config.storage_root)?;
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.pdfium_library.clone()));
        Ok(Self::new(config, storage, rasterizer))
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }
}

pub use preview::get_preview;
pub use upload::upload_file;
