//! HTTP API Request/Response Types
//!
//! JSON bodies returned by the HTTP API. Field names follow the wire format
//! the browser client already consumes (`totalPages`, not `total_pages`).

use serde::{Deserialize, Serialize};

/// Successful upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true; failures use [`ErrorResponse`]
    pub success: bool,
    /// The upload identifier
    pub filename: String,
    /// Preview URLs in page order
    pub previews: Vec<String>,
    /// Number of rendered pages (equals `previews.len()`)
    pub total_pages: usize,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short, stable reason shown to the client
    pub error: String,
    /// Precise cause, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_uses_camel_case() {
        let body = UploadResponse {
            success: true,
            filename: "1_a".into(),
            previews: vec!["/api/preview/1_a/page_1.png".into()],
            total_pages: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["filename"], "1_a");
        assert!(json.get("total_pages").is_none());
    }

    #[test]
    fn error_detail_is_omitted_when_absent() {
        let json = serde_json::to_string(&ErrorResponse::new("File not found")).unwrap();
        assert_eq!(json, r#"{"error":"File not found"}"#);
    }
}
