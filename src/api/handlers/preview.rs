//! Preview handler: serve a stored page image.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::{debug, error, info};

use super::AppState;
use crate::error::PreviewError;

/// `GET /api/preview/{*path}`
///
/// `path` is either `<id>/<image>` or a bare file name under the storage root.
pub async fn get_preview(
    State(state): State<AppState>,
    Path(requested): Path<String>,
) -> Result<impl IntoResponse, PreviewError> {
    debug!("Preview request: {}", requested);

    let file_path = match state.storage.resolve_preview(&requested).await {
        Ok(p) => p,
        Err(e) => {
            error!("Preview '{}' unavailable: {}", requested, e);
            return Err(e);
        }
    };

    info!("Serving preview image: {}", file_path.display());
    let bytes = tokio::fs::read(&file_path).await.map_err(|e| {
        error!("Error serving preview: {}", e);
        match e.kind() {
            std::io::ErrorKind::NotFound => PreviewError::NotFound,
            _ => PreviewError::Io(e),
        }
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
