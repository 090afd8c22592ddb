//! Per-message rendering: format dispatch, highlighting hand-off, and plain-text fallback.

mod code;
mod error;
mod highlight;
mod json;

pub use code::render_code;
pub use error::RenderError;
pub use highlight::{CodeNode, Highlighter, SyntectHighlighter, highlight_code_nodes};
pub use json::{JsonDisplay, format_json};

use crate::core::config::Config;
use crate::core::history::ChatMessage;
use crate::core::markup::{ConvertFormat, Converter, EscapeMode};
use crate::core::message::{Format, Message, Role};

/// Renderer switches, passed in explicitly rather than read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Hand code nodes to the highlighter, when one is installed.
    pub highlight: bool,
    pub escape: EscapeMode,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            highlight: true,
            escape: EscapeMode::Legacy,
        }
    }
}

/// Displayable body of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Markup to be inserted as HTML.
    Markup(String),
    /// Text to be inserted verbatim, never interpreted as markup.
    PlainText(String),
}

impl Body {
    pub fn as_str(&self) -> &str {
        match self {
            Body::Markup(s) | Body::PlainText(s) => s,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, Body::Markup(_))
    }
}

/// Everything the UI needs to display a message and act on it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub message_id: String,
    pub chat_id: String,
    pub role: Role,
    pub format: Format,
    /// Source text, kept for copy and persistence.
    pub raw: String,
    pub body: Body,
    /// Number of `<pre><code>` blocks in the markup.
    pub code_blocks: usize,
    pub css_classes: Vec<&'static str>,
    /// Rendering failed and `body` holds the raw content.
    pub fallback: bool,
}

impl MessageView {
    pub fn markup(&self) -> Option<&str> {
        match &self.body {
            Body::Markup(html) => Some(html),
            Body::PlainText(_) => None,
        }
    }

    pub fn copy_text(&self) -> &str {
        &self.raw
    }

    /// Persisted record for this message. Only the raw content is stored.
    pub fn to_record(&self, timestamp: i64) -> ChatMessage {
        ChatMessage {
            id: self.message_id.clone(),
            chat_id: self.chat_id.clone(),
            role: self.role,
            content: self.raw.clone(),
            format: self.format,
            timestamp,
        }
    }
}

fn css_classes(role: Role, format: Format) -> Vec<&'static str> {
    let mut classes = vec![
        "message",
        match role {
            Role::User => "user-message",
            Role::Assistant => "assistant-message",
        },
    ];
    if format == Format::Json {
        classes.push("json-content");
    }
    classes
}

/// Turns raw message content into a [`MessageView`]. Holds no mutable state.
pub struct Renderer {
    converter: Converter,
    capabilities: Capabilities,
    highlighter: Option<Box<dyn Highlighter>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

impl Renderer {
    /// Renderer without a highlighter.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            converter: Converter::new(capabilities.escape),
            capabilities,
            highlighter: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Renderer with the syntect highlighter installed when highlighting is enabled.
    pub fn from_config(config: &Config) -> Self {
        let renderer = Self::new(config.capabilities());
        if config.highlight {
            renderer.with_highlighter(Box::new(SyntectHighlighter::new(&config.theme)))
        } else {
            renderer
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Render one message. Never fails: a fault in any path yields the raw content as
    /// plain text.
    pub fn render(
        &self,
        role: Role,
        content: &str,
        format: Format,
        chat_id: &str,
        message_id: &str,
    ) -> MessageView {
        let result = self.body_for(content, format);
        self.assemble(role, content, format, chat_id, message_id, result)
    }

    pub fn render_message(&self, message: &Message) -> MessageView {
        self.render(
            message.role(),
            message.content(),
            message.format(),
            message.chat_id(),
            message.id(),
        )
    }

    pub fn render_record(&self, record: &ChatMessage) -> MessageView {
        self.render_message(&record.to_message())
    }

    fn body_for(&self, content: &str, format: Format) -> Result<Body, RenderError> {
        let html = match format {
            Format::Text => return Ok(Body::PlainText(content.to_string())),
            Format::Markdown => self.converter.convert(content, ConvertFormat::Markdown)?,
            Format::Code => render_code(&self.converter, content)?,
            Format::Json => return Ok(Body::Markup(format_json(content)?.to_html())),
        };
        match (&self.highlighter, self.capabilities.highlight) {
            (Some(highlighter), true) => Ok(Body::Markup(highlight_code_nodes(
                &html,
                highlighter.as_ref(),
            )?)),
            _ => Ok(Body::Markup(html)),
        }
    }

    fn assemble(
        &self,
        role: Role,
        content: &str,
        format: Format,
        chat_id: &str,
        message_id: &str,
        result: Result<Body, RenderError>,
    ) -> MessageView {
        let (body, fallback) = match result {
            Ok(body) => (body, false),
            Err(e) => {
                log::error!(
                    "Rendering {} message {} failed, showing raw text: {}",
                    format,
                    message_id,
                    e
                );
                (Body::PlainText(content.to_string()), true)
            }
        };
        let code_blocks = match &body {
            Body::Markup(html) => html.matches("<pre><code").count(),
            Body::PlainText(_) => 0,
        };

        MessageView {
            message_id: message_id.to_string(),
            chat_id: chat_id.to_string(),
            role,
            format,
            raw: content.to_string(),
            body,
            code_blocks,
            css_classes: css_classes(role, format),
            fallback,
        }
    }
}

#[cfg(test)]
mod tests;
