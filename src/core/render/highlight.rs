//! Syntax highlighting seam for rendered code blocks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

use regex::Captures;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::core::config::DEFAULT_THEME;
use crate::core::markup::{ConvertError, PatternCell, decode_entities, pattern};

const CODE_NODE_PATTERN: &str = r#"(?s)<pre><code class="language-([^"]*)">(.*?)</code></pre>"#;

static CODE_NODE: PatternCell = PatternCell::new();

/// One `<pre><code class="language-X">` node handed to a [`Highlighter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNode {
    language: String,
    body: String,
    highlighted: Option<String>,
}

impl CodeNode {
    pub fn new(language: &str, body: &str) -> Self {
        Self {
            language: language.to_string(),
            body: body.to_string(),
            highlighted: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Escaped body as it appears in the markup.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the body with highlighted markup and mark the node as done.
    pub fn set_highlighted(&mut self, html: String) {
        self.highlighted = Some(html);
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.is_some()
    }

    pub fn to_html(&self) -> String {
        match &self.highlighted {
            Some(html) => format!(
                "<pre><code class=\"language-{}\" data-highlighted=\"yes\">{}</code></pre>",
                self.language, html
            ),
            None => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                self.language, self.body
            ),
        }
    }
}

/// Decorates code nodes in place. Nodes left unmarked are emitted unchanged.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, node: &mut CodeNode);
}

/// Call `highlighter` once per language-tagged code node in `html`.
/// Nodes already carrying `data-highlighted` do not match and are skipped.
/// A highlighter that panics leaves its node unhighlighted.
pub fn highlight_code_nodes(
    html: &str,
    highlighter: &dyn Highlighter,
) -> Result<String, ConvertError> {
    let re = pattern(&CODE_NODE, CODE_NODE_PATTERN)?;
    Ok(re
        .replace_all(html, |caps: &Captures| {
            let node = CodeNode::new(&caps[1], &caps[2]);
            highlight_node(highlighter, &node)
                .unwrap_or(node)
                .to_html()
        })
        .into_owned())
}

fn highlight_node(highlighter: &dyn Highlighter, node: &CodeNode) -> Option<CodeNode> {
    let mut work = node.clone();
    match catch_unwind(AssertUnwindSafe(|| highlighter.highlight(&mut work))) {
        Ok(()) => Some(work),
        Err(_) => {
            log::error!(
                "Highlighter panicked on a {} block, leaving it plain",
                node.language()
            );
            None
        }
    }
}

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Map a fence language tag (e.g. "rust", "python") to a syntect extension.
fn lang_to_extension(lang: &str) -> &'static str {
    match lang.trim().to_lowercase().as_str() {
        "rs" | "rust" => "rs",
        "py" | "python" => "py",
        "js" | "javascript" => "js",
        "ts" | "typescript" => "ts",
        "go" | "golang" => "go",
        "rb" | "ruby" => "rb",
        "sh" | "bash" | "zsh" | "shell" => "sh",
        "sql" => "sql",
        "json" => "json",
        "yaml" | "yml" => "yml",
        "toml" => "toml",
        "md" | "markdown" => "md",
        "html" | "xml" => "html",
        "css" => "css",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "c++" | "cc" | "cxx" | "hpp" => "cpp",
        _ => "plain",
    }
}

/// Highlights with a bundled syntect theme, emitting inline-styled spans.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl SyntectHighlighter {
    pub fn new(theme: &str) -> Self {
        Self {
            theme: theme.to_string(),
        }
    }

    fn highlight_source(&self, lang: &str, source: &str) -> Option<String> {
        let ext = lang_to_extension(lang);
        if ext == "plain" {
            return None;
        }
        let ps = syntax_set();
        let syntax = ps.find_syntax_by_extension(ext)?;
        let ts = theme_set();
        let theme = ts.themes.get(&self.theme).or_else(|| {
            log::warn!("Unknown theme {:?}, using {}", self.theme, DEFAULT_THEME);
            ts.themes.get(DEFAULT_THEME)
        })?;

        let mut h = HighlightLines::new(syntax, theme);
        let mut out = String::with_capacity(source.len() * 2);
        for line in LinesWithEndings::from(source) {
            let regions = match h.highlight_line(line, ps) {
                Ok(regions) => regions,
                Err(e) => {
                    log::debug!("Highlighting {} failed: {}", lang, e);
                    return None;
                }
            };
            match styled_line_to_highlighted_html(&regions, IncludeBackground::No) {
                Ok(html) => out.push_str(&html),
                Err(e) => {
                    log::debug!("Highlighting {} failed: {}", lang, e);
                    return None;
                }
            }
        }
        Some(out)
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, node: &mut CodeNode) {
        let source = decode_entities(node.body());
        if let Some(html) = self.highlight_source(node.language(), &source) {
            node.set_highlighted(html);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Highlighter for Upper {
        fn highlight(&self, node: &mut CodeNode) {
            if node.language() != "plaintext" {
                let html = node.body().to_uppercase();
                node.set_highlighted(html);
            }
        }
    }

    #[test]
    fn each_code_node_is_visited_once() {
        let html = "<pre><code class=\"language-rust\">let a</code></pre>\n\
                    <pre><code class=\"language-plaintext\">b</code></pre>";
        let out = highlight_code_nodes(html, &Upper).unwrap();
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\" data-highlighted=\"yes\">LET A</code></pre>\n\
             <pre><code class=\"language-plaintext\">b</code></pre>"
        );
    }

    #[test]
    fn highlighted_nodes_are_not_revisited() {
        let once = highlight_code_nodes("<pre><code class=\"language-go\">x</code></pre>", &Upper)
            .unwrap();
        let twice = highlight_code_nodes(&once, &Upper).unwrap();
        assert_eq!(once, twice);
    }

    struct Panics;

    impl Highlighter for Panics {
        fn highlight(&self, node: &mut CodeNode) {
            if node.language() == "rust" {
                panic!("grammar blew up");
            }
            node.set_highlighted(node.body().to_uppercase());
        }
    }

    #[test]
    fn panicking_highlighter_leaves_node_plain() {
        let html = "<pre><code class=\"language-rust\">let a</code></pre>\n\
                    <pre><code class=\"language-go\">b</code></pre>";
        let out = highlight_code_nodes(html, &Panics).unwrap();
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">let a</code></pre>\n\
             <pre><code class=\"language-go\" data-highlighted=\"yes\">B</code></pre>"
        );
    }

    #[test]
    fn json_blocks_are_not_code_nodes() {
        let html = "<pre><code class=\"json-raw\">{}</code></pre>";
        assert_eq!(highlight_code_nodes(html, &Upper).unwrap(), html);
    }

    #[test]
    fn lang_to_extension_maps_aliases() {
        assert_eq!(lang_to_extension("Rust"), "rs");
        assert_eq!(lang_to_extension("python"), "py");
        assert_eq!(lang_to_extension("c++"), "cpp");
        assert_eq!(lang_to_extension("brainfuck"), "plain");
    }

    #[test]
    fn syntect_marks_known_language() {
        let mut node = CodeNode::new("rust", "fn main() {}");
        SyntectHighlighter::default().highlight(&mut node);
        assert!(node.is_highlighted());
        let html = node.to_html();
        assert!(html.contains("data-highlighted=\"yes\""));
        assert!(html.contains("<span style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn syntect_escapes_unescaped_source_again() {
        let mut node = CodeNode::new("rust", "a &lt; b");
        SyntectHighlighter::default().highlight(&mut node);
        let html = node.to_html();
        assert!(html.contains("&lt;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn syntect_leaves_unknown_language_untouched() {
        let mut node = CodeNode::new("plaintext", "text");
        SyntectHighlighter::default().highlight(&mut node);
        assert!(!node.is_highlighted());
        assert_eq!(
            node.to_html(),
            "<pre><code class=\"language-plaintext\">text</code></pre>"
        );
    }

    #[test]
    fn syntect_falls_back_to_default_theme() {
        let mut node = CodeNode::new("py", "x = 1");
        SyntectHighlighter::new("no-such-theme").highlight(&mut node);
        assert!(node.is_highlighted());
    }
}
