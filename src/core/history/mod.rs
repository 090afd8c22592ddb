//! Chat history: records, the store seam, and a JSON file store.
//!
//! Only raw `content` + `format` pairs are persisted. Markup is re-derived by the
//! renderer whenever a chat is loaded.

mod index;
mod storage;

pub use index::{chat_title, filter_chats, most_recent, sort_newest_first};
pub use storage::FileStore;

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

use crate::core::message::{Format, Message, Role};
use crate::core::render::{MessageView, Renderer};

/// A conversation. `timestamp` is the last activity in UNIX milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub name: String,
    pub timestamp: i64,
}

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub format: Format,
    pub timestamp: i64,
}

impl ChatMessage {
    /// Record for `message`, stamped now.
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            chat_id: message.chat_id().to_string(),
            role: message.role(),
            content: message.content().to_string(),
            format: message.format(),
            timestamp: now_millis(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::with_id(&self.id, &self.chat_id, self.role, &self.content, self.format)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("history file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chat not found: {0}")]
    ChatNotFound(String),
    #[error("message not found: {0}")]
    MessageNotFound(String),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("no data directory available (set CHAT_MARKUP_DATA_DIR)")]
    NoDataDir,
}

/// Create/read/update/delete over chats and their messages.
///
/// Chats list newest first, messages oldest first.
pub trait ChatStore: Send + Sync {
    fn create_chat(&self, name: &str) -> Result<Chat, HistoryError>;
    fn get_chat(&self, id: &str) -> Result<Chat, HistoryError>;
    fn rename_chat(&self, id: &str, name: &str) -> Result<Chat, HistoryError>;
    /// Delete a chat together with its messages.
    fn delete_chat(&self, id: &str) -> Result<(), HistoryError>;
    fn list_chats(&self) -> Result<Vec<Chat>, HistoryError>;
    /// Append a message and bump the owning chat's timestamp.
    fn add_message(&self, message: &ChatMessage) -> Result<(), HistoryError>;
    fn messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, HistoryError>;
    fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), HistoryError>;
    fn clear_messages(&self, chat_id: &str) -> Result<(), HistoryError>;
}

/// Current time in UNIX milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Store `message`. A chat still carrying the default name is named after its first
/// message.
pub fn append_message(
    store: &dyn ChatStore,
    message: &Message,
) -> Result<ChatMessage, HistoryError> {
    let chat = store.get_chat(message.chat_id())?;
    let unnamed = chat.name == chat_title("") && store.messages(&chat.id)?.is_empty();
    let record = ChatMessage::from_message(message);
    store.add_message(&record)?;
    if unnamed {
        store.rename_chat(&chat.id, &chat_title(message.content()))?;
    }
    Ok(record)
}

/// Re-render every stored message of a chat from its raw content.
pub fn render_chat(
    store: &dyn ChatStore,
    renderer: &Renderer,
    chat_id: &str,
) -> Result<Vec<MessageView>, HistoryError> {
    store.get_chat(chat_id)?;
    Ok(store
        .messages(chat_id)?
        .iter()
        .map(|record| renderer.render_record(record))
        .collect())
}

/// Concatenated message content per chat, for [`filter_chats`].
/// Chats whose messages cannot be read are skipped.
pub fn searchable_content(store: &dyn ChatStore, chats: &[Chat]) -> HashMap<String, String> {
    chats
        .iter()
        .filter_map(|chat| match store.messages(&chat.id) {
            Ok(messages) => {
                let parts: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
                Some((chat.id.clone(), parts.join("\n")))
            }
            Err(e) => {
                log::warn!("Skipping chat {} in search: {}", chat.id, e);
                None
            }
        })
        .collect()
}
