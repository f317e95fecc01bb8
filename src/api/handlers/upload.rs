//! Upload handler: validate, store, rasterise.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{debug, error, info};

use super::AppState;
use crate::api::types::UploadResponse;
use crate::convert;
use crate::error::UploadError;
use crate::naming::{self, UploadId};

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// An accepted file part, validated but not yet written anywhere.
struct FilePart {
    filename: String,
    extension: String,
    bytes: axum::body::Bytes,
}

/// `POST /api/upload`
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    info!("Received upload request");

    let part = match read_file_part(&state, multipart).await {
        Ok(p) => p,
        Err(e) => {
            error!("Rejected upload: {}", e);
            return Err(e);
        }
    };

    let candidate = UploadId::now(&part.filename);
    debug!("Candidate identifier {} for '{}'", candidate, part.filename);

    let doc = state
        .storage
        .save_source(&candidate, &part.extension, &part.bytes)
        .await
        .map_err(|e| {
            error!("Error saving upload: {}", e);
            UploadError::Storage(e)
        })?;
    info!("Saved {} as {}", part.filename, doc.path.display());

    let output = convert::rasterize_upload(
        &state.storage,
        state.rasterizer.clone(),
        &doc,
        state.progress.clone(),
    )
    .await
    .map_err(|e| {
        error!("Failed to process PDF {}: {}", doc.id, e);
        UploadError::Processing(e)
    })?;

    info!(
        "Processed {} with {} pages in {}ms",
        doc.id, output.total_pages, output.duration_ms
    );

    Ok(Json(UploadResponse {
        success: true,
        filename: output.id.to_string(),
        previews: output.previews,
        total_pages: output.total_pages,
    }))
}

/// Pull the first `file` part out of the body and validate its name.
///
/// Nothing touches storage here, so every rejection leaves the disk as it was.
async fn read_file_part(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FilePart, UploadError> {
    // A body that is not multipart at all carries no file part either.
    let mut multipart = multipart.map_err(|_| UploadError::NoFilePart)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Parts without a filename parameter are plain form values, not files.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if filename.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        let extension = naming::extension(&filename)
            .filter(|ext| state.config.is_allowed_extension(ext))
            .ok_or(UploadError::InvalidFileType)?;

        let bytes = field.bytes().await?;
        debug!("Read {} bytes for '{}'", bytes.len(), filename);
        return Ok(FilePart {
            filename,
            extension,
            bytes,
        });
    }

    Err(UploadError::NoFilePart)
}
