//! Local filesystem blob store.
//!
//! Blobs are written under a root directory and addressed with `file://` URLs.
//! Paths must be relative and may not climb out of the root.

use super::BlobStore;
use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Blob store backed by a directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`. The directory is created on first upload.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(Error::Storage {
                message: format!("Invalid blob path: {path:?}"),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        let absolute = tokio::fs::canonicalize(&target).await?;
        tracing::debug!(path, bytes = bytes.len(), "Stored blob");
        Ok(format!("file://{}", absolute.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::scratch_dir;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() -> Result<()> {
        let root = scratch_dir("blob-upload");
        let store = LocalBlobStore::new(&root);

        let url = store.upload(b"jpeg-bytes", "profile_images/u1.jpg").await?;
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("profile_images/u1.jpg"));

        let written = tokio::fs::read(root.join("profile_images/u1.jpg")).await?;
        assert_eq!(written, b"jpeg-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejects_escaping_paths() {
        let store = LocalBlobStore::new(scratch_dir("blob-escape"));
        for path in ["../outside.jpg", "/etc/passwd", ""] {
            let result = store.upload(b"x", path).await;
            assert!(matches!(result, Err(Error::Storage { .. })), "{path}");
        }
    }
}
