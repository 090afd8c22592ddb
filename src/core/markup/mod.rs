//! Text-to-markup conversion for model output.
//!
//! A conversion runs a fixed sequence of stages, each on the output of the previous one:
//! escape, fenced code, inline code, tables, the markdown rule table (markdown only),
//! then unescape. Fenced blocks are sealed behind placeholders after their stage so no
//! later stage rewrites their contents.

mod escape;
mod fence;
mod rules;
mod table;

use std::sync::OnceLock;

use regex::Regex;

pub use escape::{decode_entities, escape_html, unescape_html};
pub use fence::CodeBlock;
pub use rules::{Rule, inline_code, markdown_rules, wrap_lists, wrap_paragraphs};
pub use table::{Alignment, TableBlock, convert_tables};

/// Format a converter pass runs under. Only markdown applies the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertFormat {
    Text,
    #[default]
    Markdown,
}

/// How the final markup treats text that was escaped on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Unescape the whole assembled markup. Literal angle brackets in model text
    /// come out as raw characters.
    #[default]
    Legacy,
    /// Keep model text escaped; only synthesized tags are markup.
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid conversion pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub(crate) type PatternCell = OnceLock<Result<Regex, regex::Error>>;

/// Compile `source` once into `cell` and hand out the shared regex.
pub(crate) fn pattern(
    cell: &'static PatternCell,
    source: &str,
) -> Result<&'static Regex, ConvertError> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| ConvertError::Pattern(e.clone()))
}

/// Stateless converter. Copies are cheap and every call is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    escape: EscapeMode,
}

impl Converter {
    pub fn new(escape: EscapeMode) -> Self {
        Self { escape }
    }

    pub fn escape_mode(&self) -> EscapeMode {
        self.escape
    }

    /// Convert raw model text into markup.
    pub fn convert(&self, text: &str, format: ConvertFormat) -> Result<String, ConvertError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let escaped = escape_html(text);
        let sealed = fence::seal_code_blocks(&escaped)?;
        let mut html = inline_code(sealed.text())?;
        html = convert_tables(&html)?;

        if format == ConvertFormat::Markdown {
            for rule in markdown_rules()? {
                html = rule.apply(&html);
            }
            html = wrap_lists(&html)?;
            html = wrap_paragraphs(&html);
        }

        if self.escape == EscapeMode::Legacy {
            html = unescape_html(&html);
        }
        Ok(sealed.restore(&html))
    }
}

/// Convert with the default converter. Never fails: a conversion fault is logged and
/// the escaped input is returned instead.
pub fn convert(text: &str, format: ConvertFormat) -> String {
    Converter::default()
        .convert(text, format)
        .unwrap_or_else(|e| {
            log::error!("Markup conversion failed, showing escaped text: {}", e);
            escape_html(text)
        })
}
