//! Render-time bindings and the view collaborator.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Opaque key-value binding environment supplied at render time.
///
/// Consumed entirely by the view/engine side; the compile pipeline never
/// inspects it.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    bindings: BTreeMap<String, Value>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(key.into(), value.into());
        self
    }

    /// Bind a value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(key.into(), value.into());
    }

    /// Look up a binding.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate bindings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Failure reported by a [`LatexView`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ViewError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ViewError {
    /// Create a view error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying failure.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// A compiled template ready to execute (external collaborator).
///
/// The host framework owns template execution; the render pipeline only
/// needs the rendered LaTeX text and the location of the original source
/// (its directory joins the typesetting search path).
pub trait LatexView {
    /// Execute the compiled template against the given bindings.
    fn render(&self, ctx: &RenderContext) -> Result<String, ViewError>;

    /// Path to the original template source.
    fn source_path(&self) -> &Path;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_context_bindings() {
        let ctx = RenderContext::new()
            .with("title", "Invoice")
            .with("count", 3);

        assert_eq!(ctx.get("title"), Some(&Value::from("Invoice")));
        assert_eq!(ctx.get("count"), Some(&Value::from(3)));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_context_iterates_in_key_order() {
        let ctx = RenderContext::new().with("b", 2).with("a", 1);
        let keys: Vec<&str> = ctx.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_view_error_display() {
        let err = ViewError::new("undefined variable $author");
        assert_eq!(err.to_string(), "undefined variable $author");
    }
}
