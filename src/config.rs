//! Server configuration.
//!
//! Everything the handlers need to know about their environment lives in
//! [`ServerConfig`], built once at startup via [`ServerConfigBuilder`] and
//! handed to the router. Nothing is read from ambient global state while a
//! request is being served.

use crate::error::FlipifyError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Upload bodies larger than this are rejected by the transport (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Address the server listens on unless configured otherwise.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5002";

/// Storage root used when running on a managed host (ephemeral disk).
pub const MANAGED_STORAGE_ROOT: &str = "/tmp/uploads";

/// Storage root used everywhere else, relative to the working directory.
pub const LOCAL_STORAGE_ROOT: &str = "uploads";

/// Configuration for the preview server.
///
/// # Example
/// ```rust
/// use flipify::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .storage_root("/var/lib/flipify")
///     .max_upload_bytes(8 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.allowed_extensions, vec!["pdf".to_string()]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to. Default: `127.0.0.1:5002`.
    pub listen_addr: SocketAddr,

    /// Directory holding source documents and per-upload page directories.
    ///
    /// Defaults to [`MANAGED_STORAGE_ROOT`] when `RAILWAY_ENVIRONMENT` is
    /// set and [`LOCAL_STORAGE_ROOT`] otherwise.
    pub storage_root: PathBuf,

    /// Maximum accepted request body in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,

    /// Lower-case file extensions accepted by the upload endpoint. Default: `["pdf"]`.
    pub allowed_extensions: Vec<String>,

    /// Explicit path to the pdfium shared library.
    /// If None, the library is looked up next to the binary, then system-wide.
    pub pdfium_library: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5002)),
            storage_root: default_storage_root(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["pdf".to_string()],
            pdfium_library: None,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when `ext` (any case) is an accepted upload extension.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

/// Pick the storage root for the current environment.
pub fn default_storage_root() -> PathBuf {
    if std::env::var_os("RAILWAY_ENVIRONMENT").is_some() {
        PathBuf::from(MANAGED_STORAGE_ROOT)
    } else {
        PathBuf::from(LOCAL_STORAGE_ROOT)
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.storage_root = root.into();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn allowed_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.allowed_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, FlipifyError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(FlipifyError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.storage_root.as_os_str().is_empty() {
            return Err(FlipifyError::InvalidConfig(
                "storage_root must not be empty".into(),
            ));
        }
        if c.allowed_extensions.is_empty() || c.allowed_extensions.iter().any(|e| e.is_empty()) {
            return Err(FlipifyError::InvalidConfig(format!(
                "allowed_extensions must be non-empty, got {:?}",
                c.allowed_extensions
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_limit_port_and_extensions() {
        let c = ServerConfig::default();
        assert_eq!(c.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(c.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(c.allowed_extensions, vec!["pdf"]);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let c = ServerConfig::default();
        assert!(c.is_allowed_extension("pdf"));
        assert!(c.is_allowed_extension("PDF"));
        assert!(!c.is_allowed_extension("txt"));
        assert!(!c.is_allowed_extension(""));
    }

    #[test]
    fn builder_normalises_extensions() {
        let c = ServerConfig::builder()
            .allowed_extensions([".PDF", "Xps"])
            .build()
            .unwrap();
        assert_eq!(c.allowed_extensions, vec!["pdf", "xps"]);
    }

    #[test]
    fn builder_rejects_zero_limit() {
        let err = ServerConfig::builder().max_upload_bytes(0).build();
        assert!(matches!(err, Err(FlipifyError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_empty_extension_list() {
        let err = ServerConfig::builder()
            .allowed_extensions(Vec::<String>::new())
            .build();
        assert!(matches!(err, Err(FlipifyError::InvalidConfig(_))));
    }
}
