//! `code` format: prose lines interleaved with fenced blocks, scanned line by line.

use crate::core::markup::{CodeBlock, ConvertError, ConvertFormat, Converter, escape_html};

/// Language token after an opening fence, e.g. `rust` in "```rust:src/main.rs".
fn fence_language(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("```")?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || "_+#.-".contains(c)))
        .unwrap_or(rest.len());
    Some(&rest[..end]).filter(|lang| !lang.is_empty())
}

/// A fence that has been opened and not yet closed.
struct OpenFence {
    lang: Option<String>,
    body: String,
}

impl OpenFence {
    fn close(self) -> String {
        let block = CodeBlock {
            lang: self.lang,
            path: None,
            body: escape_html(self.body.trim()),
        };
        format!("{}\n", block.to_html())
    }
}

/// Render `code`-format content. Lines starting with three backticks open or close a
/// fence; other lines outside a fence are converted as markdown one at a time.
/// A fence still open at end of input is closed.
pub fn render_code(converter: &Converter, content: &str) -> Result<String, ConvertError> {
    let mut out = String::new();
    let mut fence: Option<OpenFence> = None;

    for line in content.split('\n') {
        if line.starts_with("```") {
            match fence.take() {
                Some(open) => out.push_str(&open.close()),
                None => {
                    fence = Some(OpenFence {
                        lang: fence_language(line).map(str::to_string),
                        body: String::new(),
                    })
                }
            }
        } else if let Some(open) = fence.as_mut() {
            open.body.push_str(line);
            open.body.push('\n');
        } else {
            out.push_str(&converter.convert(line, ConvertFormat::Markdown)?);
            out.push('\n');
        }
    }

    if let Some(open) = fence {
        out.push_str(&open.close());
    }
    Ok(out)
}
