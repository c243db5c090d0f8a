//! Render pipeline errors.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use templatex_storage::StoreError;
use thiserror::Error;

use crate::context::ViewError;

/// Render pipeline error.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Unrecognized destination mode.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    /// Template execution failed.
    #[error(transparent)]
    View(#[from] ViewError),
    /// The compiled path carries no file name to derive a base name from.
    #[error("compiled path has no file name: {}", .0.display())]
    InvalidCompiledPath(PathBuf),
    /// Staging the working directory or source document failed.
    #[error("failed to stage document at {}: {source}", .path.display())]
    Stage {
        /// Path being staged.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The typesetting engine could not be launched.
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        /// Engine executable name.
        binary: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The typesetting engine exited with a non-zero status.
    #[error("{binary} exited with {status}")]
    EngineFailed {
        /// Engine executable name.
        binary: String,
        /// Process exit status.
        status: ExitStatus,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The produced artifact could not be read back.
    #[error("failed to read artifact {}: {source}", .path.display())]
    Artifact {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Persisting to the artifact store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
