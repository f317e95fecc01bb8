//! PDF rasterisation: render every page to a `DynamicImage`.
//!
//! [`PageRasterizer`] is the seam between the conversion pipeline and the
//! rendering engine. [`PdfiumRasterizer`] is the production implementation;
//! tests substitute a fake that produces solid-colour pages.
//!
//! ## Threading
//!
//! Implementations are synchronous. pdfium wraps a C++ library with
//! thread-local state and must not run on async worker threads, so callers
//! invoke rasterizers from `tokio::task::spawn_blocking`.

use crate::error::{FlipifyError, RasterError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Linear zoom applied to both axes (4x pixel area).
pub const ZOOM_FACTOR: f32 = 2.0;

/// One rendered page handed to a [`PageSink`].
#[derive(Debug)]
pub struct RenderedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Page count of the document.
    pub total_pages: usize,
    pub image: DynamicImage,
}

/// Receives pages in document order. Returning an error aborts rendering.
pub type PageSink<'a> = dyn FnMut(RenderedPage) -> Result<(), RasterError> + 'a;

/// Renders the pages of a stored document.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf_path` in order, passing each to `sink`.
    ///
    /// # Returns
    /// The number of pages handed to `sink`.
    fn render_pages(&self, pdf_path: &Path, sink: &mut PageSink<'_>)
        -> Result<usize, RasterError>;
}

/// pdfium-backed rasterizer.
///
/// Bindings and the document handle are acquired per call and released when
/// the call returns, on success and error paths alike.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Rasterizer using the library at `library`, or the default lookup if None.
    pub fn new(library: Option<PathBuf>) -> Self {
        Self { library }
    }

    /// Bind once to check that the library can be loaded at all.
    pub fn probe(&self) -> Result<(), FlipifyError> {
        bind_pdfium(self.library.as_deref())
            .map(|_| ())
            .map_err(|e| FlipifyError::EngineUnavailable(e.to_string()))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_pages(
        &self,
        pdf_path: &Path,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, RasterError> {
        let pdfium = bind_pdfium(self.library.as_deref())?;

        let document =
            pdfium
                .load_pdf_from_file(pdf_path, None)
                .map_err(|e| RasterError::OpenFailed {
                    path: pdf_path.to_path_buf(),
                    detail: format!("{:?}", e),
                })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(ZOOM_FACTOR);

        for (idx, page) in pages.iter().enumerate() {
            let page_num = idx + 1;
            debug!("Processing page {}/{}", page_num, total_pages);

            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| RasterError::RenderFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );

            sink(RenderedPage {
                page_num,
                total_pages,
                image,
            })?;
        }

        Ok(total_pages)
    }
}

/// Load pdfium from an explicit path, or from next to the binary, then system-wide.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, RasterError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| RasterError::EngineUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
