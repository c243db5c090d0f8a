//! Escape-directive translation and marker restoration.
//!
//! LaTeX sources embed host-template expressions through a `\tmpl` escape
//! directive with three forms:
//!
//! - `\tmpl{!! expr !!}` — raw output, rewritten to `{!! expr !!}` verbatim
//!   (inner whitespace is significant to the host engine and preserved);
//! - `\tmpl{{ expr }}` — escaped output, hidden behind a marker-token pair so
//!   the host engine never sees the double braces next to LaTeX's own braces;
//! - `\tmpl{content}` — literal pass-through, used to smuggle host control
//!   directives (conditionals, loops, includes) through untouched.
//!
//! Translation runs as three independent full-text passes in that order.
//! A regex locates the directive head; a small scanner then classifies the
//! form by the bytes after the opening brace and finds the matching
//! terminator. The literal scan tracks brace depth, so nested LaTeX groups
//! inside a literal body close where the braces balance. Bodies beginning
//! with `{` or `!!` are never literal candidates, which keeps the raw and
//! echo forms out of the literal pass even when they are unterminated.
//!
//! After host compilation, [`EchoRestore`] rewrites every surviving marker
//! pair into the engine's escaped-echo statement. The marker sentinels are
//! assumed never to occur in legitimate document text; a collision is
//! undefined behavior and is not detected.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::Stage;

/// Start sentinel standing in for an echo directive across host compilation.
pub const ECHO_START: &str = "###TMPL_ECHO_START###";

/// End sentinel paired with [`ECHO_START`].
pub const ECHO_END: &str = "###TMPL_ECHO_END###";

/// Directive head: the `\tmpl` keyword, optional whitespace, opening brace.
static DIRECTIVE_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\tmpl\s*\{").unwrap());

/// Marker pair with the wrapped expression; spans newlines.
static ECHO_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)###TMPL_ECHO_START###(.*?)###TMPL_ECHO_END###").unwrap()
});

/// Rewrite every directive whose body `translate` recognizes.
///
/// `translate` receives the text starting right after the opening brace and
/// returns the number of bytes it consumed plus the replacement for the whole
/// directive. Returning `None` leaves the text untouched; an unmatched
/// directive is not an error.
fn rewrite_directives<F>(content: String, mut translate: F) -> String
where
    F: FnMut(&str) -> Option<(usize, String)>,
{
    if !DIRECTIVE_HEAD.is_match(&content) {
        return content;
    }

    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for head in DIRECTIVE_HEAD.find_iter(&content) {
        // Heads inside an already-consumed body belong to that body.
        if head.start() < last {
            continue;
        }
        let body = &content[head.end()..];
        let Some((consumed, replacement)) = translate(body) else {
            continue;
        };
        out.push_str(&content[last..head.start()]);
        out.push_str(&replacement);
        last = head.end() + consumed;
    }
    out.push_str(&content[last..]);
    out
}

/// Raw body: `!! … !!}` after the opening brace. Inner bytes kept verbatim.
fn raw_body(body: &str) -> Option<(usize, String)> {
    let inner = body.strip_prefix("!!")?;
    let close = inner.find("!!}")?;
    Some((2 + close + 3, format!("{{!!{}!!}}", &inner[..close])))
}

/// Echo body: `{ … }}` after the opening brace. Inner trimmed, wrapped in
/// marker sentinels.
fn echo_body(body: &str) -> Option<(usize, String)> {
    let inner = body.strip_prefix('{')?;
    let close = inner.find("}}")?;
    let expr = inner[..close].trim();
    Some((1 + close + 2, format!("{ECHO_START}{expr}{ECHO_END}")))
}

/// Literal body: anything not starting with `{` or `!!`, closed where the
/// brace depth returns to zero. Inner trimmed.
fn literal_body(body: &str) -> Option<(usize, String)> {
    if body.starts_with('{') || body.starts_with("!!") {
        return None;
    }
    let mut depth = 1usize;
    for (idx, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((idx + 1, body[..idx].trim().to_owned()));
                }
            }
            _ => {}
        }
    }
    None
}

/// Built-in processor stage: `\tmpl{!! expr !!}` → `{!! expr !!}`.
pub(crate) struct RawTranslate;

impl Stage for RawTranslate {
    fn name(&self) -> &str {
        "escape-raw"
    }

    fn apply(&mut self, content: String) -> String {
        rewrite_directives(content, raw_body)
    }
}

/// Built-in processor stage: `\tmpl{{ expr }}` → marker-wrapped expression.
pub(crate) struct EchoTranslate;

impl Stage for EchoTranslate {
    fn name(&self) -> &str {
        "escape-echo"
    }

    fn apply(&mut self, content: String) -> String {
        rewrite_directives(content, echo_body)
    }
}

/// Built-in processor stage: `\tmpl{content}` → trimmed content.
pub(crate) struct LiteralTranslate;

impl Stage for LiteralTranslate {
    fn name(&self) -> &str {
        "escape-literal"
    }

    fn apply(&mut self, content: String) -> String {
        rewrite_directives(content, literal_body)
    }
}

/// Built-in restorer stage: every marker pair becomes the engine's
/// escaped-echo statement for the wrapped expression.
pub(crate) struct EchoRestore {
    emit: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl EchoRestore {
    pub(crate) fn new(emit: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            emit: Box::new(emit),
        }
    }
}

impl Stage for EchoRestore {
    fn name(&self) -> &str {
        "echo-restore"
    }

    fn apply(&mut self, content: String) -> String {
        if !content.contains(ECHO_START) {
            return content;
        }
        ECHO_MARKER
            .replace_all(&content, |caps: &regex::Captures<'_>| (self.emit)(&caps[1]))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(content: &str) -> String {
        RawTranslate.apply(content.to_owned())
    }

    fn echo(content: &str) -> String {
        EchoTranslate.apply(content.to_owned())
    }

    fn literal(content: &str) -> String {
        LiteralTranslate.apply(content.to_owned())
    }

    fn translate(content: &str) -> String {
        literal(&echo(&raw(content)))
    }

    fn marker(expr: &str) -> String {
        format!("{ECHO_START}{expr}{ECHO_END}")
    }

    #[test]
    fn test_raw_directive_unwraps_to_brace_group() {
        assert_eq!(raw("\\tmpl{!! $title !!}"), "{!! $title !!}");
    }

    #[test]
    fn test_raw_preserves_inner_whitespace() {
        assert_eq!(raw("\\tmpl{!!  $var  !!}"), "{!!  $var  !!}");
    }

    #[test]
    fn test_raw_allows_whitespace_before_brace() {
        assert_eq!(raw("\\tmpl  {!! $var !!}"), "{!! $var !!}");
    }

    #[test]
    fn test_raw_spans_newlines() {
        let input = "\\tmpl{!! isset($data)\n    ? $data\n    : \"default\" !!}";
        assert_eq!(raw(input), "{!! isset($data)\n    ? $data\n    : \"default\" !!}");
    }

    #[test]
    fn test_echo_directive_becomes_marker() {
        assert_eq!(echo("\\tmpl{{ $name }}"), marker("$name"));
    }

    #[test]
    fn test_echo_trims_inner_whitespace() {
        assert_eq!(echo("\\tmpl{{  $var  }}"), marker("$var"));
        assert_eq!(echo("\\tmpl  {{$var}}"), marker("$var"));
    }

    #[test]
    fn test_echo_multiline_body_trims_outer_only() {
        let input = "\\tmpl{{\n        $multiline\n        ? \"yes\"\n        : \"no\"\n    }}";
        assert_eq!(
            echo(input),
            marker("$multiline\n        ? \"yes\"\n        : \"no\"")
        );
    }

    #[test]
    fn test_echo_inside_latex_group_keeps_outer_braces() {
        assert_eq!(
            echo("\\textbf{\\tmpl{{ $hello }}}"),
            format!("\\textbf{{{}}}", marker("$hello"))
        );
    }

    #[test]
    fn test_literal_directive_unwraps_and_trims() {
        assert_eq!(literal("\\tmpl{Some literal content}"), "Some literal content");
        assert_eq!(literal("\\tmpl { some text }"), "some text");
    }

    #[test]
    fn test_literal_with_nested_braces_closes_on_balance() {
        assert_eq!(literal("\\tmpl{a \\emph{b} c}"), "a \\emph{b} c");
    }

    #[test]
    fn test_literal_excludes_raw_and_echo_bodies() {
        // Content starting with `{` or `!!` is never a literal candidate,
        // even when the echo/raw form is unterminated.
        assert_eq!(literal("\\tmpl{{a}}"), "\\tmpl{{a}}");
        assert_eq!(literal("\\tmpl{!! $x !!}"), "\\tmpl{!! $x !!}");
        assert_eq!(literal("\\tmpl{{a}"), "\\tmpl{{a}");
    }

    #[test]
    fn test_empty_literal() {
        assert_eq!(literal("\\tmpl{}"), "");
    }

    #[test]
    fn test_unterminated_bodies_pass_through() {
        assert_eq!(translate("\\tmpl{!! $x"), "\\tmpl{!! $x");
        assert_eq!(translate("\\tmpl{{ $x"), "\\tmpl{{ $x");
        assert_eq!(translate("\\tmpl{never closed"), "\\tmpl{never closed");
    }

    #[test]
    fn test_ordinary_latex_braces_untouched() {
        let input = "\\section{Title} \\textbf{Bold} \\frac{1}{2}";
        assert_eq!(translate(input), input);
    }

    #[test]
    fn test_no_directive_is_not_an_error() {
        assert_eq!(translate("plain text"), "plain text");
        assert_eq!(translate(""), "");
    }

    #[test]
    fn test_longer_command_names_do_not_match() {
        assert_eq!(translate("\\tmplx{content}"), "\\tmplx{content}");
    }

    #[test]
    fn test_mixed_directives_on_one_line() {
        let output = translate("\\tmpl{{ $first }} and \\tmpl{!! $second !!} with \\tmpl{literal}");
        assert_eq!(
            output,
            format!("{} and {{!! $second !!}} with literal", marker("$first"))
        );
    }

    #[test]
    fn test_full_document_translation() {
        let input = "\
\\documentclass{article}
\\newcommand{\\tmpl}[1]{}
\\begin{document}
\\tmpl{!! $title !!}
\\tmpl{{ $name }}
\\tmpl{Some literal content}
\\end{document}
";
        let output = translate(input);
        assert!(output.contains("{!! $title !!}"));
        assert!(output.contains(&marker("$name")));
        assert!(output.contains("Some literal content"));
        assert!(output.contains("\\documentclass{article}"));
    }

    #[test]
    fn test_echo_restore_emits_engine_statement() {
        let mut restore = EchoRestore::new(|expr| format!("<echo {expr}>"));
        let output = restore.apply(marker("$name"));
        assert_eq!(output, "<echo $name>");
    }

    #[test]
    fn test_echo_restore_spans_newlines() {
        let mut restore = EchoRestore::new(|expr| format!("<echo {expr}>"));
        let output = restore.apply(marker("$a\n? $b\n: $c"));
        assert_eq!(output, "<echo $a\n? $b\n: $c>");
    }

    #[test]
    fn test_echo_restore_multiple_markers() {
        let mut restore = EchoRestore::new(|expr| format!("[{expr}]"));
        let input = format!("x {} y {} z", marker("$a"), marker("$b"));
        assert_eq!(restore.apply(input), "x [$a] y [$b] z");
    }

    #[test]
    fn test_echo_restore_without_markers_is_identity() {
        let mut restore = EchoRestore::new(|expr| format!("[{expr}]"));
        assert_eq!(restore.apply("no markers here".to_owned()), "no markers here");
    }
}
