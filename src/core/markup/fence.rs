//! Fenced code blocks: extraction, rendering, and sealing.

use regex::Captures;

use super::{ConvertError, PatternCell, pattern};

/// Opener: three backticks, optional language token, optional `:path`, newline.
/// Body: everything up to the next three backticks.
const FENCE_PATTERN: &str = r"(?s)```([A-Za-z0-9_+#.-]+)?(?::(\S+))?[ \t]*\n(.+?)```";

static FENCE: PatternCell = PatternCell::new();

const SEAL_OPEN: char = '\u{E000}';
const SEAL_CLOSE: char = '\u{E001}';

/// A fenced code block. `body` is HTML-escaped and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub lang: Option<String>,
    pub path: Option<String>,
    pub body: String,
}

impl CodeBlock {
    /// Language used in the `language-*` class.
    pub fn language(&self) -> &str {
        self.lang.as_deref().unwrap_or("plaintext")
    }

    pub fn to_html(&self) -> String {
        let label = self
            .path
            .as_ref()
            .map(|p| format!("<div class=\"code-file-path\">{}</div>", p))
            .unwrap_or_default();
        format!(
            "{}<pre><code class=\"language-{}\">{}</code></pre>",
            label,
            self.language(),
            self.body
        )
    }
}

/// Text with its fenced blocks replaced by placeholders.
pub(super) struct Sealed {
    text: String,
    blocks: Vec<String>,
}

impl Sealed {
    pub(super) fn text(&self) -> &str {
        &self.text
    }

    /// Put the rendered blocks back in place of their placeholders.
    /// Placeholder-like text that does not name a sealed block is kept as is.
    pub(super) fn restore(&self, html: &str) -> String {
        if self.blocks.is_empty() {
            return html.to_string();
        }
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(start) = rest.find(SEAL_OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + SEAL_OPEN.len_utf8()..];
            let block = after.find(SEAL_CLOSE).and_then(|end| {
                after[..end]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.blocks.get(idx))
                    .map(|b| (end, b))
            });
            match block {
                Some((end, html)) => {
                    out.push_str(html);
                    rest = &after[end + SEAL_CLOSE.len_utf8()..];
                }
                None => {
                    out.push(SEAL_OPEN);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Render every fenced block in already-escaped text and seal it behind a placeholder.
///
/// Marker characters already present in the text are turned into character references
/// first, so only placeholders produced here can be restored.
pub(super) fn seal_code_blocks(escaped: &str) -> Result<Sealed, ConvertError> {
    let re = pattern(&FENCE, FENCE_PATTERN)?;
    let neutral = escaped
        .replace(SEAL_OPEN, &format!("&#{};", SEAL_OPEN as u32))
        .replace(SEAL_CLOSE, &format!("&#{};", SEAL_CLOSE as u32));
    let mut blocks = Vec::new();
    let text = re
        .replace_all(&neutral, |caps: &Captures| {
            let block = CodeBlock {
                lang: caps.get(1).map(|m| m.as_str().to_string()),
                path: caps.get(2).map(|m| m.as_str().to_string()),
                body: caps[3].trim().to_string(),
            };
            let idx = blocks.len();
            blocks.push(block.to_html());
            format!("{}{}{}", SEAL_OPEN, idx, SEAL_CLOSE)
        })
        .into_owned();
    Ok(Sealed { text, blocks })
}

/// Whether a line begins with a sealed block.
pub(super) fn starts_sealed(line: &str) -> bool {
    line.starts_with(SEAL_OPEN)
}
