//! Progress-callback trait for per-page conversion events.
//!
//! The server installs [`LoggingProgress`], which writes one `tracing` line
//! per page. Library users can inject their own
//! [`Arc<dyn ConversionProgressCallback>`] through
//! [`crate::api::AppState::with_progress`] to forward events elsewhere.
//!
//! Callbacks fire from the blocking render thread, so implementations must
//! be `Send + Sync` and must not block for long.

use std::sync::Arc;
use tracing::{error, info};

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the document is opened.
    fn on_conversion_start(&self, upload_id: &str) {
        let _ = upload_id;
    }

    /// Called after a page image has been written to the staging directory.
    ///
    /// # Arguments
    /// * `page_num`    - 1-indexed page number
    /// * `total_pages` - page count reported by the document
    /// * `png_bytes`   - size of the encoded PNG
    fn on_page_complete(&self, page_num: usize, total_pages: usize, png_bytes: usize) {
        let _ = (page_num, total_pages, png_bytes);
    }

    /// Called once when the conversion aborts.
    fn on_conversion_error(&self, upload_id: &str, error: &str) {
        let _ = (upload_id, error);
    }

    /// Called once after the page directory has been published.
    fn on_conversion_complete(&self, upload_id: &str, total_pages: usize) {
        let _ = (upload_id, total_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Logs every event through `tracing`. Default for the HTTP server.
pub struct LoggingProgress;

impl ConversionProgressCallback for LoggingProgress {
    fn on_conversion_start(&self, upload_id: &str) {
        info!("Converting upload {} to images", upload_id);
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, png_bytes: usize) {
        info!(
            "Processed page {}/{} ({} bytes PNG)",
            page_num, total_pages, png_bytes
        );
    }

    fn on_conversion_error(&self, upload_id: &str, err: &str) {
        error!("Error converting upload {}: {}", upload_id, err);
    }

    fn on_conversion_complete(&self, upload_id: &str, total_pages: usize) {
        info!(
            "Successfully converted {} pages for upload {}",
            total_pages, upload_id
        );
    }
}

/// Convenience alias for the type stored in the server state.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        bytes: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, png_bytes: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(png_bytes, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _upload_id: &str, total_pages: usize) {
            self.completed_total.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start("1_a");
        cb.on_page_complete(1, 2, 42);
        cb.on_conversion_error("1_a", "boom");
        cb.on_conversion_complete("1_a", 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_complete(1, 2, 100);
        tracker.on_page_complete(2, 2, 200);
        tracker.on_conversion_complete("1_a", 2);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.bytes.load(Ordering::SeqCst), 300);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_logging_callback_works() {
        let cb: ProgressCallback = Arc::new(LoggingProgress);
        cb.on_conversion_start("1_a");
        cb.on_page_complete(1, 1, 512);
        cb.on_conversion_complete("1_a", 1);
    }
}
