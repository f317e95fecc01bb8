//! Error types for flipify.
//!
//! Errors are split by where they surface:
//!
//! * [`FlipifyError`] - **Fatal**: the service cannot start (bad
//!   configuration, unusable storage root, pdfium not loadable).
//!
//! * [`RasterError`] - a single conversion failed. The variant tells the
//!   caller *where* it failed (engine, open, render, encode, write) instead of
//!   collapsing everything into "no pages".
//!
//! * [`UploadError`] / [`PreviewError`] - request-level failures. Both
//!   implement [`IntoResponse`] so handlers can return them directly. The
//!   client receives a JSON body of the form `{"error": "..."}`, except for
//!   malformed or oversized multipart bodies, which keep axum's plain-text
//!   rejection.

use crate::api::types::ErrorResponse;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while configuring or starting the service.
#[derive(Debug, Error)]
pub enum FlipifyError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The storage root could not be created or resolved.
    #[error("Storage root '{path}' is unusable: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib) to point the\n\
server at an existing copy, or place the library next to the binary.\n"
    )]
    EngineUnavailable(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a document could not be converted into page images.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The pdfium library could not be loaded for this conversion.
    #[error("PDF engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The document could not be opened (corrupt, encrypted, not a PDF).
    #[error("Failed to open '{path}': {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The rendered bitmap could not be PNG-encoded.
    #[error("PNG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// A page image or the upload directory could not be written.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document opened fine but produced zero pages.
    #[error("Document has no pages")]
    NoPages,

    /// The blocking render task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of `POST /api/upload`.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Invalid file type")]
    InvalidFileType,

    /// Reading the multipart body failed (includes the body size limit).
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// Saving the uploaded document failed.
    #[error("{0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to process PDF")]
    Processing(#[source] RasterError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFilePart | Self::NoSelectedFile | Self::InvalidFileType => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart(e) => e.status(),
            Self::Storage(_) | Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            // Body-limit and framing errors keep axum's own plain-text rejection.
            Self::Multipart(e) => (e.status(), e.body_text()).into_response(),
            Self::Processing(ref cause) => {
                let body = ErrorResponse::new(self.to_string()).with_detail(cause.to_string());
                (self.status(), Json(body)).into_response()
            }
            other => (other.status(), Json(ErrorResponse::new(other.to_string()))).into_response(),
        }
    }
}

/// Failures of `GET /api/preview/{*path}`.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Missing file, or a path that would resolve outside the storage root.
    #[error("File not found")]
    NotFound,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_use_short_messages() {
        assert_eq!(UploadError::NoFilePart.to_string(), "No file part");
        assert_eq!(UploadError::NoSelectedFile.to_string(), "No selected file");
        assert_eq!(UploadError::InvalidFileType.to_string(), "Invalid file type");
        assert_eq!(UploadError::NoFilePart.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn processing_error_keeps_generic_message() {
        let e = UploadError::Processing(RasterError::NoPages);
        assert_eq!(e.to_string(), "Failed to process PDF");
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn render_failed_display() {
        let e = RasterError::RenderFailed {
            page: 3,
            detail: "bad stream".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad stream"));
    }

    #[test]
    fn preview_not_found_status() {
        let resp = PreviewError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_error_surfaces_io_message() {
        let e = UploadError::Storage(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        ));
        assert_eq!(e.to_string(), "read-only file system");
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
