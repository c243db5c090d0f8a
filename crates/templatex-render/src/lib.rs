//! Rendering compiled LaTeX templates into finished documents.
//!
//! The compile side of templatex produces executable template code; this
//! crate takes over at render time. [`DocumentRenderer`] executes a
//! [`LatexView`] against a [`RenderContext`], stages the rendered LaTeX
//! into an isolated working directory, runs the external typesetting
//! engine (pdflatex by default) with the assembled `TEXINPUTS` search
//! path, and delivers the PDF according to a [`Destination`] mode — as an
//! inline or download [`DocumentResponse`], persisted through a
//! [`templatex_storage::ArtifactStore`], or via a caller-supplied
//! dispatcher.
//!
//! Execution is synchronous and blocking; see [`DocumentRenderer`] for the
//! concurrency notes.

mod context;
mod destination;
mod error;
mod renderer;
mod response;
mod texinputs;

pub use context::{LatexView, RenderContext, ViewError};
pub use destination::Destination;
pub use error::RenderError;
pub use renderer::DocumentRenderer;
pub use response::{Disposition, DocumentResponse, RenderOutput};
pub use texinputs::assemble_search_paths;
