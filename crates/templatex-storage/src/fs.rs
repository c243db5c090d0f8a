//! Filesystem store implementation.
//!
//! Provides [`FsStore`], a store rooted at a directory on the local
//! filesystem. Parent directories are created on demand during `put`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::{ArtifactStore, StoreError, StoreErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem-backed [`ArtifactStore`] rooted at a directory.
///
/// Artifact names resolve relative to the root; names escaping the root
/// (absolute paths, `..` segments) are rejected.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory itself is created
    /// lazily on the first `put`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an artifact name against the root, rejecting escapes.
    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(name);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        if name.is_empty() || escapes {
            return Err(StoreError::new(StoreErrorKind::InvalidPath)
                .with_path(name)
                .with_backend(BACKEND));
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for FsStore {
    fn put(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io(e, Some(parent.to_path_buf())).with_backend(BACKEND))?;
        }
        fs::write(&path, contents)
            .map_err(|e| StoreError::io(e, Some(path.clone())).with_backend(BACKEND))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "stored artifact");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(name)?;
        fs::read(&path).map_err(|e| StoreError::io(e, Some(path.clone())).with_backend(BACKEND))
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok_and(|path| path.exists())
    }
}
