//! Conversion entry point: stored document → published page images.
//!
//! Pages are written into a hidden staging directory first. Only when every
//! page has been rendered, encoded and written is the directory renamed to
//! `<root>/<id>/`. A failed conversion therefore leaves no partial page set
//! behind; the staging guard removes whatever was written.

use crate::error::RasterError;
use crate::naming::{page_image_name, preview_url, UploadId};
use crate::pipeline::encode;
use crate::pipeline::render::{PageRasterizer, RenderedPage};
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use crate::storage::{Storage, StoredDocument};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub id: UploadId,
    /// Preview URLs in page order.
    pub previews: Vec<String>,
    pub total_pages: usize,
    /// The published upload directory.
    pub directory: PathBuf,
    pub duration_ms: u64,
}

/// Rasterise `doc` into `<root>/<id>/page_<n>.png`.
///
/// Runs on the blocking pool. Returns [`RasterError::NoPages`] when the
/// document rendered zero pages.
pub async fn rasterize_upload(
    storage: &Storage,
    rasterizer: Arc<dyn PageRasterizer>,
    doc: &StoredDocument,
    progress: ProgressCallback,
) -> Result<ConversionOutput, RasterError> {
    let storage = storage.clone();
    let doc = doc.clone();

    tokio::task::spawn_blocking(move || {
        rasterize_blocking(&storage, rasterizer.as_ref(), &doc, progress.as_ref())
    })
    .await
    .map_err(|e| RasterError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of [`rasterize_upload`].
pub fn rasterize_blocking(
    storage: &Storage,
    rasterizer: &dyn PageRasterizer,
    doc: &StoredDocument,
    progress: &dyn ConversionProgressCallback,
) -> Result<ConversionOutput, RasterError> {
    let start = Instant::now();
    progress.on_conversion_start(doc.id.as_str());

    match stage_and_publish(storage, rasterizer, doc, progress) {
        Ok(total_pages) => {
            progress.on_conversion_complete(doc.id.as_str(), total_pages);
            Ok(ConversionOutput {
                previews: (1..=total_pages).map(|n| preview_url(&doc.id, n)).collect(),
                total_pages,
                directory: storage.upload_dir(&doc.id),
                duration_ms: start.elapsed().as_millis() as u64,
                id: doc.id.clone(),
            })
        }
        Err(e) => {
            progress.on_conversion_error(doc.id.as_str(), &e.to_string());
            Err(e)
        }
    }
}

fn stage_and_publish(
    storage: &Storage,
    rasterizer: &dyn PageRasterizer,
    doc: &StoredDocument,
    progress: &dyn ConversionProgressCallback,
) -> Result<usize, RasterError> {
    let staging = storage
        .create_staging()
        .map_err(|source| RasterError::WriteFailed {
            path: storage.root().to_path_buf(),
            source,
        })?;
    let staging_path = staging.path().to_path_buf();

    let mut written = 0usize;
    let reported = rasterizer.render_pages(&doc.path, &mut |page: RenderedPage| -> Result<(), RasterError> {
        let png = encode::encode_page(&page.image).map_err(|e| RasterError::EncodeFailed {
            page: page.page_num,
            detail: e.to_string(),
        })?;

        let path = staging_path.join(page_image_name(page.page_num));
        std::fs::write(&path, &png).map_err(|source| RasterError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        written += 1;
        progress.on_page_complete(page.page_num, page.total_pages, png.len());
        Ok(())
    })?;

    if written == 0 {
        return Err(RasterError::NoPages);
    }
    if written != reported {
        return Err(RasterError::Internal(format!(
            "rasterizer reported {} pages but delivered {}",
            reported, written
        )));
    }

    storage
        .publish(staging, &doc.id)
        .map_err(|source| RasterError::WriteFailed {
            path: storage.upload_dir(&doc.id),
            source,
        })?;

    Ok(written)
}
