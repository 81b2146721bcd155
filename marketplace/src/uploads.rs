//! Image blob storage on the local filesystem.
//!
//! Files are written as `<uuid-v4>_<sanitized original name>` so concurrent
//! uploads of the same name never collide. Listings store only the file
//! name; the directory is served under `/uploads`.

use chaingo_core::{MarketError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Longest sanitized name kept after the uuid prefix.
const MAX_NAME_LEN: usize = 100;

/// An image received with a request, not yet written.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-provided file name, if any
    pub file_name: Option<String>,
    /// File content
    pub bytes: Vec<u8>,
}

/// Directory-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Store images under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Upload directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `uploads` in order and return their stored names.
    ///
    /// Empty uploads are skipped. If any write fails, files already written
    /// by this call are removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if a file cannot be written.
    pub async fn save_all(&self, uploads: Vec<ImageUpload>) -> Result<Vec<String>> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads.into_iter().filter(|u| !u.bytes.is_empty()) {
            match self.save(upload).await {
                Ok(name) => stored.push(name),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    async fn save(&self, upload: ImageUpload) -> Result<String> {
        let name = format!(
            "{}_{}",
            Uuid::new_v4(),
            sanitize_file_name(upload.file_name.as_deref().unwrap_or_default())
        );
        tokio::fs::write(self.dir.join(&name), &upload.bytes)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, file = %name, "Failed to write image");
                MarketError::Internal(format!("failed to store image: {e}"))
            })?;

        tracing::debug!(file = %name, bytes = upload.bytes.len(), "Image stored");
        Ok(name)
    }

    /// Remove previously stored files, ignoring ones already gone.
    ///
    /// Names that are not plain file names inside the directory are skipped.
    pub async fn discard(&self, names: &[String]) {
        for name in names {
            if !is_plain_file_name(name) {
                tracing::warn!(file = %name, "Refusing to remove image outside upload directory");
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %e, file = %name, "Failed to remove orphaned image");
                }
            }
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

/// Reduce a client file name to a safe final component.
///
/// Directory parts are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, leading dots are stripped and the result is capped in length.
/// Returns `"image"` when nothing usable is left.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let last = original.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed: String = cleaned
        .trim_start_matches('.')
        .chars()
        .rev()
        .take(MAX_NAME_LEN)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed
    }
}
