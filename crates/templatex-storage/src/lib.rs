//! Durable artifact store abstraction.
//!
//! Rendered documents (PDF binaries, staged LaTeX sources) are persisted
//! through the [`ArtifactStore`] trait so the render pipeline never cares
//! which backend holds them. [`StoreError`] carries a semantic kind plus
//! backend-specific source, mirrored across backends.
//!
//! # Implementations
//!
//! - [`FsStore`]: rooted directory on the local filesystem
//! - [`MemStore`] for testing (behind `mock` feature flag)
//!
//! # Name Convention
//!
//! Artifact names are store-relative slash-separated paths
//! (e.g. `"invoices/2026/invoice.pdf"`). Absolute names and `..` segments
//! are rejected as [`StoreErrorKind::InvalidPath`].

mod fs;
#[cfg(feature = "mock")]
mod mem;

pub use fs::FsStore;
#[cfg(feature = "mock")]
pub use mem::MemStore;

use std::path::PathBuf;

/// Semantic error categories for store operations.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Artifact does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid artifact name.
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mem").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreErrorKind::NotFound).with_path(path)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            _ => StoreErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidPath => "Invalid path",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Durable artifact store.
///
/// Backends persist named byte blobs; the render pipeline writes PDF
/// artifacts and staged LaTeX sources through this trait.
pub trait ArtifactStore: Send + Sync {
    /// Persist `contents` under `name`, overwriting any existing artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the name is invalid or the write fails.
    fn put(&self, name: &str, contents: &[u8]) -> Result<(), StoreError>;

    /// Read an artifact back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the artifact doesn't exist or can't be read.
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Check whether an artifact exists.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, name: &str) -> bool;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<S> {
    fn put(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        (**self).put(name, contents)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_store_error_new() {
        let err = StoreError::new(StoreErrorKind::NotFound);

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert!(err.path.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_store_error_not_found() {
        let err = StoreError::not_found("out/doc.pdf");

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.path.as_deref(), Some(Path::new("out/doc.pdf")));
    }

    #[test]
    fn test_store_error_io_mapping() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StoreError::io(io_err, None);

        assert_eq!(err.kind, StoreErrorKind::PermissionDenied);
    }

    #[test]
    fn test_store_error_display_simple() {
        let err = StoreError::new(StoreErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_store_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = StoreError::new(StoreErrorKind::NotFound)
            .with_backend("Fs")
            .with_path("doc.pdf")
            .with_source(io_err);

        assert_eq!(err.to_string(), "[Fs] Not found: no such file (path: doc.pdf)");
    }

    #[test]
    fn test_store_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
