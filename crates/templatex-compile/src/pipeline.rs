//! Ordered text-transformation pipelines.
//!
//! A [`Pipeline`] holds a fixed list of built-in stages followed by
//! caller-registered stages. [`Pipeline::run`] threads the document text
//! through every stage in order; each stage receives the previous stage's
//! output. Stages are never removed, and every compiler instance owns its
//! own pipelines.

/// A named text-transformation stage.
///
/// Stages transform the whole document text and return the next stage's
/// input. Returning the input unchanged is the normal "no match" case.
pub trait Stage: Send {
    /// Short identifier used in trace logs.
    fn name(&self) -> &str;

    /// Transform the document text.
    fn apply(&mut self, content: String) -> String;
}

/// Adapter that turns a plain closure into a [`Stage`].
///
/// Built via [`stage_fn`]; the dominant style for one-off caller extensions:
///
/// ```
/// use templatex_compile::stage_fn;
///
/// let stage = stage_fn("bibref", |content: String| {
///     content.replace("\\bibref{", "\\cite{")
/// });
/// ```
pub struct FnStage<F> {
    name: String,
    f: F,
}

/// Create a [`Stage`] from a name and a `String -> String` closure.
pub fn stage_fn<F>(name: impl Into<String>, f: F) -> FnStage<F>
where
    F: FnMut(String) -> String + Send,
{
    FnStage {
        name: name.into(),
        f,
    }
}

impl<F> Stage for FnStage<F>
where
    F: FnMut(String) -> String + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, content: String) -> String {
        (self.f)(content)
    }
}

/// Ordered stage list: built-ins first, then registered stages.
pub struct Pipeline {
    builtin: Vec<Box<dyn Stage>>,
    registered: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create a pipeline with the given built-in stages.
    #[must_use]
    pub fn new(builtin: Vec<Box<dyn Stage>>) -> Self {
        Self {
            builtin,
            registered: Vec::new(),
        }
    }

    /// Append a caller stage after the built-ins and any previously
    /// registered stages.
    pub fn add<S: Stage + 'static>(&mut self, stage: S) {
        self.registered.push(Box::new(stage));
    }

    /// Run every stage in order, threading the text through.
    pub fn run(&mut self, mut content: String) -> String {
        for stage in self.builtin.iter_mut().chain(self.registered.iter_mut()) {
            tracing::trace!(stage = stage.name(), "applying stage");
            content = stage.apply(content);
        }
        content
    }

    /// Total number of stages, built-in and registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builtin.len() + self.registered.len()
    }

    /// True when the pipeline has no stages at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.registered.is_empty()
    }
}
