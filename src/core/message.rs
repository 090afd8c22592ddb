//! Message data model: roles, declared formats, and the raw message record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" | "bot" => Ok(Role::Assistant),
            _ => Err(ParseFieldError::Role(s.to_string())),
        }
    }
}

/// Declared format of a message. Selects the rendering path.
///
/// Deserializing an unknown label yields [`Format::Markdown`], the renderer's fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Format {
    #[default]
    Text,
    Markdown,
    Code,
    Json,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Markdown => "markdown",
            Format::Code => "code",
            Format::Json => "json",
        }
    }

    /// Parse a declared format, falling back to markdown for unrecognized labels.
    pub fn parse_lossy(s: &str) -> Format {
        s.parse().unwrap_or_else(|_| {
            log::debug!("Unrecognized format {:?}, rendering as markdown", s);
            Format::Markdown
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "markdown" => Ok(Format::Markdown),
            "code" => Ok(Format::Code),
            "json" => Ok(Format::Json),
            _ => Err(ParseFieldError::Format(s.to_string())),
        }
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format::parse_lossy(&s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseFieldError {
    #[error("unknown role: {0:?} (expected user or assistant)")]
    Role(String),
    #[error("unknown format: {0:?} (expected text, markdown, code or json)")]
    Format(String),
}

/// A chat message. `content` is the unprocessed source text and never changes
/// after creation; rendered markup is always derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    chat_id: String,
    role: Role,
    content: String,
    format: Format,
}

impl Message {
    /// Create a message with a fresh id.
    pub fn new(chat_id: &str, role: Role, content: &str, format: Format) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), chat_id, role, content, format)
    }

    pub fn with_id(id: &str, chat_id: &str, role: Role, content: &str, format: Format) -> Self {
        Self {
            id: id.to_string(),
            chat_id: chat_id.to_string(),
            role,
            content: content.to_string(),
            format,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn format(&self) -> Format {
        self.format
    }
}
