//! Pipeline stages for turning a stored document into page images.
//!
//! ```text
//! render ──▶ encode ──▶ staging dir ──▶ publish
//! (pdfium)   (PNG)      (page_N.png)    (rename to <id>/)
//! ```
//!
//! 1. [`render`] - rasterise every page at 2x zoom behind the
//!    [`render::PageRasterizer`] seam; pdfium is the production backend
//! 2. [`encode`] - drop alpha and PNG-encode each `DynamicImage`
//!
//! Orchestration (staging, writes, publication, URLs) lives in
//! [`crate::convert`].

pub mod encode;
pub mod render;
