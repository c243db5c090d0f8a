//! LaTeX-aware template compilation.
//!
//! LaTeX and brace-delimited template languages fight over `{`/`}`. This
//! crate resolves the ambiguity with a two-pass transformation around the
//! host engine: a `\tmpl` escape directive marks the spans that belong to
//! the template language, a processor pipeline rewrites them into
//! engine-safe syntax (hiding escaped-echo expressions behind marker
//! tokens), and a restorer pipeline rewrites the surviving markers into the
//! engine's escaped-output form after compilation.
//!
//! The host engine itself is an external collaborator behind the
//! [`TemplateEngine`] trait; see [`TexCompiler`] for the orchestration and
//! [`Stage`]/[`stage_fn`] for caller-registered pipeline extensions.

mod compiler;
mod engine;
mod escape;
mod pipeline;

pub use compiler::{CompileError, TexCompiler};
pub use engine::{EngineError, StubEngine, TemplateEngine, hashed_compiled_path};
pub use escape::{ECHO_END, ECHO_START};
pub use pipeline::{FnStage, Pipeline, Stage, stage_fn};
