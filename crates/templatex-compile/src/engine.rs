//! Host template engine adapter.
//!
//! The compiler never parses the host language's own directive grammar
//! (conditionals, loops, includes, echo forms); it delegates that to a
//! [`TemplateEngine`] and only guarantees that the three escape forms
//! survive, or are safely hidden from, the engine.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Failure reported by a [`TemplateEngine`].
///
/// Engines adapt their own error types via [`EngineError::with_source`];
/// the compiler propagates these untouched.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// Create an engine error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying engine failure.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// The host template compiler this crate wraps.
///
/// Implementations must leave the echo marker sentinels untouched during
/// [`compile_string`](Self::compile_string) — the sentinels are not valid
/// host syntax by design, so a correct engine passes them through.
pub trait TemplateEngine: Send + Sync {
    /// Compile host directive syntax into executable template code.
    fn compile_string(&self, source: &str) -> Result<String, EngineError>;

    /// Deterministic, injective mapping from a template source path to the
    /// path its compiled output is persisted under.
    fn compiled_path(&self, source: &Path) -> PathBuf;

    /// Executable statement, in this engine's compiled form, that evaluates
    /// `expr` and emits the result escaped.
    fn escaped_echo(&self, expr: &str) -> String;
}

/// Default compiled-path mapping: SHA-256 of the source path, hex-encoded,
/// under `cache_dir` with the engine's compiled extension.
///
/// Engines are free to use their own scheme; this one satisfies the
/// determinism and injectivity contract out of the box.
#[must_use]
pub fn hashed_compiled_path(cache_dir: &Path, source: &Path, extension: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(source.to_string_lossy().as_bytes());
    let digest = hex::encode(hasher.finalize());
    cache_dir.join(format!("{digest}.{extension}"))
}

/// Identity engine for tests and wiring examples.
///
/// `compile_string` passes text through unchanged, which makes the full
/// translate → compile → restore pipeline observable from the outside.
pub struct StubEngine {
    cache_dir: PathBuf,
}

impl StubEngine {
    /// Create a stub engine persisting compiled output under `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }
}

impl TemplateEngine for StubEngine {
    fn compile_string(&self, source: &str) -> Result<String, EngineError> {
        Ok(source.to_owned())
    }

    fn compiled_path(&self, source: &Path) -> PathBuf {
        hashed_compiled_path(&self.cache_dir, source, "txc")
    }

    fn escaped_echo(&self, expr: &str) -> String {
        format!("(* echo escape({expr}) *)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_compiled_path_is_deterministic() {
        let a = hashed_compiled_path(Path::new("/cache"), Path::new("doc.tex"), "txc");
        let b = hashed_compiled_path(Path::new("/cache"), Path::new("doc.tex"), "txc");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hashed_compiled_path_distinguishes_sources() {
        let a = hashed_compiled_path(Path::new("/cache"), Path::new("doc.tex"), "txc");
        let b = hashed_compiled_path(Path::new("/cache"), Path::new("other.tex"), "txc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hashed_compiled_path_shape() {
        let path = hashed_compiled_path(Path::new("/cache"), Path::new("doc.tex"), "txc");
        assert!(path.starts_with("/cache"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("txc"));
        // 64 hex chars + ".txc"
        assert_eq!(path.file_name().map_or(0, |n| n.len()), 64 + 4);
    }

    #[test]
    fn test_stub_engine_is_identity() {
        let engine = StubEngine::new("/tmp/compiled");
        assert_eq!(
            engine.compile_string("a {{ b }} c").unwrap(),
            "a {{ b }} c"
        );
    }

    #[test]
    fn test_stub_engine_escaped_echo() {
        let engine = StubEngine::new("/tmp/compiled");
        assert_eq!(engine.escaped_echo("$name"), "(* echo escape($name) *)");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::new("unexpected token");
        assert_eq!(err.to_string(), "unexpected token");
    }

    #[test]
    fn test_engine_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing include");
        let err = EngineError::new("include failed").with_source(io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
