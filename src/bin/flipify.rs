//! CLI binary for flipify.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServerConfig`, checks that pdfium loads, and runs the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use flipify::{AppState, HttpServer, PdfiumRasterizer, ServerConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (127.0.0.1:5002), storing under ./uploads
  flipify

  # Listen on all interfaces with a custom storage root
  flipify --listen 0.0.0.0:8080 --storage-root /var/lib/flipify

  # Use a specific pdfium build
  flipify --pdfium-lib /opt/pdfium/lib/libpdfium.so

ENDPOINTS:
  POST /api/upload                        multipart form, field "file"
  GET  /api/preview/<id>/page_<n>.png     rendered page image

ENVIRONMENT:
  RAILWAY_ENVIRONMENT   When set, the default storage root is /tmp/uploads
  RUST_LOG              Overrides --verbose / --quiet log filtering
"#;

#[derive(Parser, Debug)]
#[command(
    name = "flipify",
    version,
    about = "Serve PNG page previews of uploaded PDF documents",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Socket address to listen on [default: 127.0.0.1:5002].
    #[arg(long, env = "FLIPIFY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Directory holding uploaded documents and rendered pages.
    #[arg(long, env = "FLIPIFY_STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Maximum accepted request body size in bytes [default: 16 MiB].
    #[arg(long, env = "FLIPIFY_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLIPIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLIPIFY_QUIET")]
    quiet: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ServerConfig> {
        let mut builder = ServerConfig::builder();
        if let Some(addr) = self.listen {
            builder = builder.listen_addr(addr);
        }
        if let Some(root) = &self.storage_root {
            builder = builder.storage_root(root);
        }
        if let Some(limit) = self.max_upload_bytes {
            builder = builder.max_upload_bytes(limit);
        }
        if let Some(lib) = &self.pdfium_lib {
            builder = builder.pdfium_library(lib);
        }
        builder.build().context("Invalid server configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.to_config()?;
    info!(
        "Storage root: {} (max upload {} bytes)",
        config.storage_root.display(),
        config.max_upload_bytes
    );

    // ── Ensure PDFium engine is available ────────────────────────────────
    PdfiumRasterizer::new(config.pdfium_library.clone())
        .probe()
        .context("PDFium is not available")?;

    let state = AppState::from_config(config).context("Failed to initialise storage")?;

    HttpServer::new(state)
        .run(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
