//! Upload identifiers and filename handling.
//!
//! An identifier is `"<unix_seconds>_<base>"` where `base` is the uploaded
//! filename without its extension, reduced to a filesystem-safe ASCII form.
//! It names both the stored source document and the page directory, so it
//! must never contain a path separator or start with a dot.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use unicode_normalization::UnicodeNormalization;

/// Base used when sanitisation leaves nothing of the original name.
pub const FALLBACK_BASE: &str = "document";

/// Primary key of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId(String);

impl UploadId {
    /// Identifier for `filename` uploaded at `timestamp` (Unix seconds).
    pub fn new(timestamp: u64, filename: &str) -> Self {
        Self(format!("{}_{}", timestamp, sanitized_base(filename)))
    }

    /// Identifier for `filename` uploaded now.
    pub fn now(filename: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(ts, filename)
    }

    /// The `n`-th alternative for an identifier that is already taken.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}_{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UploadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lower-cased extension after the last `.`, if the name has one.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Filename without its final extension (`"a.b.pdf"` → `"a.b"`).
///
/// Leading dots of the last path segment never start an extension, so
/// `".pdf"` and `"..pdf"` keep their whole name.
pub fn base_name(filename: &str) -> &str {
    let Some(idx) = filename.rfind('.') else {
        return filename;
    };
    let segment_start = filename.rfind(['/', '\\']).map_or(0, |sep| sep + 1);

    // A dot inside a directory name, or only dots before the last one.
    if idx < segment_start || filename[segment_start..idx].chars().all(|c| c == '.') {
        filename
    } else {
        &filename[..idx]
    }
}

/// Reduce a filename to `[A-Za-z0-9_.-]`.
///
/// The name is NFKD-decomposed first so accented letters keep their base
/// letter; whatever is still non-ASCII is dropped. Path separators become spaces,
/// whitespace runs collapse to `_`, and leading/trailing `.`/`_` are
/// stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Sanitised base of `filename`, falling back to [`FALLBACK_BASE`].
pub fn sanitized_base(filename: &str) -> String {
    let base = secure_filename(base_name(filename));
    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// Name of the image for a 1-based page number.
pub fn page_image_name(page_num: usize) -> String {
    format!("page_{}.png", page_num)
}

/// Client-facing URL of one page image.
pub fn preview_url(id: &UploadId, page_num: usize) -> String {
    format!("/api/preview/{}/{}", id, page_image_name(page_num))
}
