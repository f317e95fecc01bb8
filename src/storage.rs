//! On-disk layout of uploads.
//!
//! ```text
//! <root>/
//!   <id>.<ext>            source document, written once
//!   <id>/page_<n>.png     published page images
//!   .staging-XXXXXX/      in-flight conversion, renamed to <id>/ on success
//! ```
//!
//! The filesystem is the only shared state between requests. Identifiers
//! are reserved by creating the source file with `create_new`, which the OS
//! guarantees to succeed for exactly one caller.

use crate::error::{FlipifyError, PreviewError};
use crate::naming::UploadId;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Upper bound on `_<n>` suffixes tried for one identifier.
const MAX_ID_ATTEMPTS: u32 = 1000;

const STAGING_PREFIX: &str = ".staging-";

/// Handle to the storage root.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

/// A source document that has been written to disk under a reserved identifier.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: UploadId,
    pub path: PathBuf,
}

impl Storage {
    /// Use `root` as storage, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FlipifyError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| FlipifyError::StorageUnavailable {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_path(&self, id: &UploadId, ext: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, ext))
    }

    pub fn upload_dir(&self, id: &UploadId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Write `bytes` as the source document of a fresh upload.
    ///
    /// Starts from `candidate` and appends `_2`, `_3`, … until an identifier
    /// is found whose source file and upload directory are both unused.
    pub async fn save_source(
        &self,
        candidate: &UploadId,
        ext: &str,
        bytes: &[u8],
    ) -> std::io::Result<StoredDocument> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = if attempt == 1 {
                candidate.clone()
            } else {
                candidate.with_suffix(attempt)
            };

            if tokio::fs::try_exists(self.upload_dir(&id)).await? {
                continue;
            }

            let path = self.source_path(&id, ext);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            file.write_all(bytes).await?;
            file.flush().await?;
            if attempt > 1 {
                info!("Identifier {} taken, using {}", candidate, id);
            }
            debug!("Saved {} bytes to {}", bytes.len(), path.display());
            return Ok(StoredDocument { id, path });
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free identifier for '{}'", candidate),
        ))
    }

    /// Create a hidden staging directory for one conversion.
    ///
    /// Dropping the returned guard deletes the directory and anything in it.
    pub fn create_staging(&self) -> std::io::Result<TempDir> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
    }

    /// Move a finished staging directory into place as `<root>/<id>/`.
    pub fn publish(&self, staging: TempDir, id: &UploadId) -> std::io::Result<PathBuf> {
        let target = self.upload_dir(id);
        std::fs::rename(staging.path(), &target)?;
        // The guard now points at a path that no longer exists; its cleanup is a no-op.
        drop(staging);
        debug!("Published {}", target.display());
        Ok(target)
    }

    /// Resolve a preview request path to a file inside the storage root.
    ///
    /// `"<id>/<name>"` addresses a page image; a bare `"<name>"` addresses a
    /// file directly under the root. Anything that is not a plain relative
    /// path, or that resolves (through symlinks) outside the root, is
    /// reported as [`PreviewError::NotFound`].
    pub async fn resolve_preview(&self, requested: &str) -> Result<PathBuf, PreviewError> {
        let relative = parse_preview_path(requested).ok_or(PreviewError::NotFound)?;
        let joined = self.root.join(&relative);

        let resolved = match tokio::fs::canonicalize(&joined).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(PreviewError::NotFound),
            Err(e) => return Err(PreviewError::Io(e)),
        };
        let root = tokio::fs::canonicalize(&self.root).await?;

        if !resolved.starts_with(&root) {
            return Err(PreviewError::NotFound);
        }
        if !tokio::fs::metadata(&resolved).await?.is_file() {
            return Err(PreviewError::NotFound);
        }
        Ok(resolved)
    }
}

/// Turn a request path into a safe relative path, or `None` if it is unsafe.
fn parse_preview_path(requested: &str) -> Option<PathBuf> {
    if requested.is_empty() || requested.contains(['\\', '\0']) {
        return None;
    }

    let relative = match requested.split_once('/') {
        Some((id, name)) if !id.is_empty() && !name.is_empty() => Path::new(id).join(name),
        Some(_) => return None,
        None => PathBuf::from(requested),
    };

    let only_normal = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    // Hidden entries (staging directories) are never served.
    let hidden = relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));

    (only_normal && !hidden).then_some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_id_and_flat_forms() {
        assert_eq!(
            parse_preview_path("1_a/page_1.png"),
            Some(PathBuf::from("1_a/page_1.png"))
        );
        assert_eq!(parse_preview_path("x.png"), Some(PathBuf::from("x.png")));
    }

    #[test]
    fn parse_rejects_traversal() {
        assert_eq!(parse_preview_path("../secret"), None);
        assert_eq!(parse_preview_path("id/../../etc/passwd"), None);
        assert_eq!(parse_preview_path("/etc/passwd"), None);
        assert_eq!(parse_preview_path("id\\..\\x"), None);
        assert_eq!(parse_preview_path(".staging-abc/page_1.png"), None);
        assert_eq!(parse_preview_path(""), None);
    }

    #[tokio::test]
    async fn save_source_reserves_unique_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        let id = UploadId::new(100, "report.pdf");

        let first = storage.save_source(&id, "pdf", b"%PDF-1").await.unwrap();
        let second = storage.save_source(&id, "pdf", b"%PDF-2").await.unwrap();

        assert_eq!(first.id.as_str(), "100_report");
        assert_eq!(second.id.as_str(), "100_report_2");
        assert_eq!(std::fs::read(&first.path).unwrap(), b"%PDF-1");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"%PDF-2");
    }

    #[tokio::test]
    async fn save_source_skips_existing_upload_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        let id = UploadId::new(100, "report.pdf");
        std::fs::create_dir(storage.upload_dir(&id)).unwrap();

        let saved = storage.save_source(&id, "pdf", b"x").await.unwrap();
        assert_eq!(saved.id.as_str(), "100_report_2");
    }

    #[test]
    fn publish_moves_staging_into_place() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        let id = UploadId::new(1, "a.pdf");

        let staging = storage.create_staging().unwrap();
        let staged = staging.path().to_path_buf();
        std::fs::write(staged.join("page_1.png"), b"png").unwrap();

        let dir = storage.publish(staging, &id).unwrap();
        assert!(dir.join("page_1.png").is_file());
        assert!(!staged.exists());
    }

    #[test]
    fn dropped_staging_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        let staging = storage.create_staging().unwrap();
        let staged = staging.path().to_path_buf();
        std::fs::write(staged.join("page_1.png"), b"png").unwrap();
        drop(staging);
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn resolve_preview_finds_files_and_rejects_misses() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        std::fs::create_dir(tmp.path().join("1_a")).unwrap();
        std::fs::write(tmp.path().join("1_a/page_1.png"), b"png").unwrap();

        let found = storage.resolve_preview("1_a/page_1.png").await.unwrap();
        assert!(found.ends_with("1_a/page_1.png"));

        assert!(matches!(
            storage.resolve_preview("1_a/page_2.png").await,
            Err(PreviewError::NotFound)
        ));
        assert!(matches!(
            storage.resolve_preview("1_a").await,
            Err(PreviewError::NotFound)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resolve_preview_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.png"), b"secret").unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("1_link")).unwrap();

        assert!(matches!(
            storage.resolve_preview("1_link/secret.png").await,
            Err(PreviewError::NotFound)
        ));
    }
}
