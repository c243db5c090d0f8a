//! Compiler orchestration: escape translation, host compilation, marker
//! restoration, and compiled-output persistence.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::engine::{EngineError, TemplateEngine};
use crate::escape::{EchoRestore, EchoTranslate, LiteralTranslate, RawTranslate};
use crate::pipeline::{Pipeline, Stage};

/// Compilation error.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Template source could not be read.
    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        /// Template source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Compiled output could not be written.
    #[error("failed to write compiled output {}: {source}", .path.display())]
    Write {
        /// Compiled output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The host engine rejected the processed source.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// LaTeX-aware template compiler.
///
/// Wraps a host [`TemplateEngine`] with two per-instance pipelines:
/// processors translate the escape directives before the engine runs, and
/// restorers rewrite surviving echo markers afterwards. Both pipelines start
/// with fixed built-in stages; callers extend them via
/// [`add_processor`](Self::add_processor) / [`add_restorer`](Self::add_restorer),
/// which append in registration order and support fluent chaining:
///
/// ```
/// use templatex_compile::{StubEngine, TexCompiler, stage_fn};
///
/// let mut compiler = TexCompiler::new(StubEngine::new("/tmp/compiled"));
/// compiler
///     .add_processor(stage_fn("bibref", |c: String| c.replace("\\bibref{", "\\cite{")))
///     .add_restorer(stage_fn("footer", |c: String| c + "\n% generated"));
/// ```
pub struct TexCompiler<E> {
    engine: Arc<E>,
    processors: Pipeline,
    restorers: Pipeline,
}

impl<E: TemplateEngine + 'static> TexCompiler<E> {
    /// Create a compiler around the given host engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        let engine = Arc::new(engine);
        let processors = Pipeline::new(vec![
            Box::new(RawTranslate),
            Box::new(EchoTranslate),
            Box::new(LiteralTranslate),
        ]);
        let emitter = Arc::clone(&engine);
        let restorers = Pipeline::new(vec![Box::new(EchoRestore::new(move |expr| {
            emitter.escaped_echo(expr)
        }))]);
        Self {
            engine,
            processors,
            restorers,
        }
    }

    /// Append a stage to the pre-compilation pipeline.
    pub fn add_processor<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.processors.add(stage);
        self
    }

    /// Append a stage to the post-compilation pipeline.
    pub fn add_restorer<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.restorers.add(stage);
        self
    }

    /// Run the pre-compilation pipeline only.
    ///
    /// Useful for inspecting the escape translation without involving the
    /// host engine.
    pub fn translate(&mut self, source: &str) -> String {
        self.processors.run(source.to_owned())
    }

    /// Compile in-memory source text: processors, host engine, restorers.
    pub fn compile_source(&mut self, source: &str) -> Result<String, CompileError> {
        let processed = self.processors.run(source.to_owned());
        let compiled = self.engine.compile_string(&processed)?;
        Ok(self.restorers.run(compiled))
    }

    /// Compile the template at `path` and persist the output under the
    /// engine's compiled path, creating parent directories as needed.
    ///
    /// Returns the compiled path. Writes are plain `fs::write`; on a race
    /// the last writer wins.
    pub fn compile(&mut self, path: &Path) -> Result<PathBuf, CompileError> {
        tracing::debug!(path = %path.display(), "compiling template");
        let source = std::fs::read_to_string(path).map_err(|source| CompileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let output = self.compile_source(&source)?;

        let compiled = self.engine.compiled_path(path);
        if let Some(parent) = compiled.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CompileError::Write {
                path: compiled.clone(),
                source,
            })?;
        }
        std::fs::write(&compiled, &output).map_err(|source| CompileError::Write {
            path: compiled.clone(),
            source,
        })?;
        tracing::debug!(compiled = %compiled.display(), "wrote compiled template");
        Ok(compiled)
    }

    /// The engine's compiled path for a template source.
    #[must_use]
    pub fn compiled_path(&self, path: &Path) -> PathBuf {
        self.engine.compiled_path(path)
    }
}
