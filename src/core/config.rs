//! Runtime configuration loaded from the environment (after `.env` via dotenv).

use std::env;
use std::path::PathBuf;

use crate::core::markup::EscapeMode;
use crate::core::render::Capabilities;

/// Theme used by the syntect highlighter when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Model used for completion requests when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_MAX_CHATS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Overrides the platform data directory for chat history.
    pub data_dir: Option<PathBuf>,
    /// Keep model text escaped in the final markup instead of unescaping it.
    pub strict_escape: bool,
    /// Hand rendered code blocks to the syntax highlighter.
    pub highlight: bool,
    pub theme: String,
    /// Oldest chats beyond this count are pruned on create. 0 disables pruning.
    pub max_chats: u32,
    pub model_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            strict_escape: false,
            highlight: true,
            theme: DEFAULT_THEME.to_string(),
            max_chats: DEFAULT_MAX_CHATS,
            model_id: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn escape_mode(&self) -> EscapeMode {
        if self.strict_escape {
            EscapeMode::Strict
        } else {
            EscapeMode::Legacy
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            highlight: self.highlight,
            escape: self.escape_mode(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Load configuration from the process environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(|key| env::var(key).ok())
}

/// Load configuration through `lookup`. Unset or empty variables keep their defaults.
pub fn load_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = Config::default();

    if let Some(dir) = get("CHAT_MARKUP_DATA_DIR") {
        config.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(v) = get("CHAT_MARKUP_STRICT_ESCAPE") {
        config.strict_escape = parse_bool("CHAT_MARKUP_STRICT_ESCAPE", &v)?;
    }
    if let Some(v) = get("CHAT_MARKUP_HIGHLIGHT") {
        config.highlight = parse_bool("CHAT_MARKUP_HIGHLIGHT", &v)?;
    }
    if let Some(theme) = get("CHAT_MARKUP_THEME") {
        config.theme = theme;
    }
    if let Some(v) = get("CHAT_MARKUP_MAX_CHATS") {
        config.max_chats = v.parse().map_err(|_| ConfigError::InvalidValue {
            var: "CHAT_MARKUP_MAX_CHATS",
            value: v.clone(),
        })?;
    }
    if let Some(model) = get("CHAT_MARKUP_MODEL") {
        config.model_id = model;
    }
    Ok(config)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}
