//! Centralized path helpers for the config and chat data directories.

use std::path::PathBuf;

use crate::core::app;
use crate::core::config::Config;

/// Project directories (config, cache, data) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/chat-markup/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Data directory for chats (~/.local/share/chat-markup/chats/).
/// `CHAT_MARKUP_DATA_DIR` (via [`Config::data_dir`]) takes precedence.
pub fn data_dir(config: &Config) -> Option<PathBuf> {
    if let Some(dir) = &config.data_dir {
        return Some(dir.clone());
    }
    project_dirs().map(|d| d.data_dir().join("chats"))
}
