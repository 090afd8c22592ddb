//! `json` format: best-effort pretty printing.

use serde_json::Value;

use crate::core::markup::escape_html;

/// Outcome of JSON formatting. Unparseable content is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonDisplay {
    /// Parsed and re-serialized with 2-space indentation, keys in source order.
    Parsed(String),
    Raw(String),
}

impl JsonDisplay {
    pub fn text(&self) -> &str {
        match self {
            JsonDisplay::Parsed(s) | JsonDisplay::Raw(s) => s,
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<pre><code class=\"json-raw\">{}</code></pre>",
            escape_html(self.text())
        )
    }
}

/// Pretty-print `content` when it parses as JSON; otherwise keep it raw.
pub fn format_json(content: &str) -> Result<JsonDisplay, serde_json::Error> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(JsonDisplay::Parsed(serde_json::to_string_pretty(&value)?)),
        Err(e) => {
            log::warn!("Showing JSON message verbatim: {}", e);
            Ok(JsonDisplay::Raw(content.to_string()))
        }
    }
}
