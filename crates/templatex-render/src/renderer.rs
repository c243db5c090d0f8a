//! Render-to-document orchestration.
//!
//! [`DocumentRenderer`] drives the linear pipeline: execute the compiled
//! template, stage the LaTeX source into a per-invocation working
//! directory, assemble the typesetting search path, invoke the engine as a
//! blocking subprocess, collect the PDF artifact, and dispatch it according
//! to the requested [`Destination`].
//!
//! Working directories are unique per invocation (created under the temp
//! root with the compiled base name as prefix), so concurrent renders of
//! the same source never race on the engine's auxiliary files. No timeout
//! is imposed on the subprocess and there is no cancellation once it has
//! started.

use std::path::{Path, PathBuf};
use std::process::Command;

use templatex_config::Config;
use templatex_storage::ArtifactStore;

use crate::context::{LatexView, RenderContext};
use crate::destination::Destination;
use crate::error::RenderError;
use crate::response::{Disposition, DocumentResponse, RenderOutput};
use crate::texinputs::assemble_search_paths;

/// Fixed non-interactive flag set passed to the typesetting engine.
const ENGINE_FLAGS: [&str; 4] = [
    "--max-print-line=10000",
    "-synctex=1",
    "-interaction=nonstopmode",
    "-file-line-error",
];

/// Everything produced by one engine invocation.
struct StagedDocument {
    /// Rendered LaTeX source text.
    latex: String,
    /// Collected PDF artifact bytes.
    pdf: Vec<u8>,
    /// Path of the staged `.tex` source document.
    tex_path: PathBuf,
    /// Working directory; removed on drop.
    _workdir: tempfile::TempDir,
}

/// Renders compiled LaTeX templates to PDF documents.
pub struct DocumentRenderer {
    binary: String,
    temp_root: PathBuf,
    search_roots: Vec<PathBuf>,
    store: Box<dyn ArtifactStore>,
}

impl DocumentRenderer {
    /// Create a renderer with defaults: `pdflatex`, the system temp
    /// directory, and no extra search roots.
    #[must_use]
    pub fn new(store: Box<dyn ArtifactStore>) -> Self {
        Self {
            binary: "pdflatex".to_owned(),
            temp_root: std::env::temp_dir(),
            search_roots: Vec::new(),
            store,
        }
    }

    /// Create a renderer from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config, store: Box<dyn ArtifactStore>) -> Self {
        Self {
            binary: config.engine_resolved.binary.clone(),
            temp_root: config.engine_resolved.temp_dir.clone(),
            search_roots: config.local_disk_roots().to_vec(),
            store,
        }
    }

    /// Set the typesetting engine executable.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the root under which per-render working directories are created.
    #[must_use]
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    /// Set the search roots placed before the template source directory in
    /// the engine's search path.
    #[must_use]
    pub fn with_search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    /// Render `view` and dispatch the artifact by destination mode.
    ///
    /// `compiled_path` is the compiler's output path for this view's source;
    /// its file stem names the staged working files, so repeated renders of
    /// one source stay recognizable in the temp root. The destination string
    /// is validated before any work happens.
    pub fn render(
        &self,
        view: &dyn LatexView,
        ctx: &RenderContext,
        compiled_path: &Path,
        file_name: &str,
        destination: &str,
    ) -> Result<RenderOutput, RenderError> {
        let destination = destination.parse::<Destination>()?;
        let staged = self.produce(view, ctx, compiled_path)?;
        self.dispatch(destination, staged, file_name)
    }

    /// Render `view` and hand the artifact to a caller-supplied dispatcher.
    ///
    /// The dispatcher receives the render context, the PDF bytes, the
    /// requested file name, and the staged source document's path, and fully
    /// owns the returned output.
    pub fn render_with<F>(
        &self,
        view: &dyn LatexView,
        ctx: &RenderContext,
        compiled_path: &Path,
        file_name: &str,
        dispatch: F,
    ) -> Result<RenderOutput, RenderError>
    where
        F: FnOnce(&RenderContext, &[u8], &str, &Path) -> Result<RenderOutput, RenderError>,
    {
        let staged = self.produce(view, ctx, compiled_path)?;
        dispatch(ctx, &staged.pdf, file_name, &staged.tex_path)
    }

    /// Steps 1–5: render, stage, assemble search paths, invoke, collect.
    fn produce(
        &self,
        view: &dyn LatexView,
        ctx: &RenderContext,
        compiled_path: &Path,
    ) -> Result<StagedDocument, RenderError> {
        let latex = view.render(ctx)?;

        let base = compiled_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| RenderError::InvalidCompiledPath(compiled_path.to_path_buf()))?
            .to_owned();

        std::fs::create_dir_all(&self.temp_root).map_err(|source| RenderError::Stage {
            path: self.temp_root.clone(),
            source,
        })?;
        let workdir = tempfile::Builder::new()
            .prefix(&format!("{base}-"))
            .tempdir_in(&self.temp_root)
            .map_err(|source| RenderError::Stage {
                path: self.temp_root.clone(),
                source,
            })?;

        let tex_path = workdir.path().join(format!("{base}.tex"));
        std::fs::write(&tex_path, &latex).map_err(|source| RenderError::Stage {
            path: tex_path.clone(),
            source,
        })?;

        let source_dir = view.source_path().parent().unwrap_or(Path::new("."));
        let texinputs = assemble_search_paths(&self.search_roots, source_dir);

        tracing::debug!(
            binary = %self.binary,
            workdir = %workdir.path().display(),
            "invoking typesetting engine"
        );
        let output = Command::new(&self.binary)
            .args(ENGINE_FLAGS)
            .arg(format!("{base}.tex"))
            .current_dir(workdir.path())
            .env("TEXINPUTS", &texinputs)
            .output()
            .map_err(|source| RenderError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::EngineFailed {
                binary: self.binary.clone(),
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let pdf_path = workdir.path().join(format!("{base}.pdf"));
        let pdf = std::fs::read(&pdf_path).map_err(|source| RenderError::Artifact {
            path: pdf_path,
            source,
        })?;

        Ok(StagedDocument {
            latex,
            pdf,
            tex_path,
            _workdir: workdir,
        })
    }

    /// Step 6: deliver or persist the artifact.
    fn dispatch(
        &self,
        destination: Destination,
        staged: StagedDocument,
        file_name: &str,
    ) -> Result<RenderOutput, RenderError> {
        if destination.stores_pdf() {
            self.store.put(file_name, &staged.pdf)?;
        }

        match destination {
            Destination::Inline | Destination::StorageInline => {
                Ok(RenderOutput::Response(DocumentResponse {
                    body: staged.pdf,
                    file_name: file_name.to_owned(),
                    content_type: "application/pdf",
                    disposition: Disposition::Inline,
                }))
            }
            Destination::Download | Destination::StorageDownload => {
                Ok(RenderOutput::Response(DocumentResponse {
                    body: staged.pdf,
                    file_name: file_name.to_owned(),
                    content_type: "application/pdf",
                    disposition: Disposition::Attachment,
                }))
            }
            Destination::Storage => Ok(RenderOutput::Stored),
            Destination::Tex => Ok(RenderOutput::Response(DocumentResponse {
                body: staged.latex.into_bytes(),
                file_name: tex_name(file_name),
                content_type: "application/x-tex",
                disposition: Disposition::Attachment,
            })),
            Destination::TexString => Ok(RenderOutput::Response(DocumentResponse {
                body: staged.latex.into_bytes(),
                file_name: tex_name(file_name),
                content_type: "text/plain",
                disposition: Disposition::Inline,
            })),
            Destination::StorageTex => {
                self.store.put(&tex_name(file_name), staged.latex.as_bytes())?;
                Ok(RenderOutput::Stored)
            }
        }
    }
}

/// Swap a requested file name's extension to `.tex`.
fn tex_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    format!("{stem}.tex")
}
