//! JSON file store: `index.json` plus one `chat_<id>.json` per chat.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::paths;

use super::{Chat, ChatMessage, ChatStore, HistoryError, index, now_millis};

/// Chats in creation order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    chats: Vec<Chat>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatFile {
    messages: Vec<ChatMessage>,
}

/// File-backed [`ChatStore`]. Read-modify-write sequences are serialized by a lock;
/// every file is replaced atomically (write to `.tmp`, then rename).
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    max_chats: u32,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_chats: 0,
            lock: Mutex::new(()),
        }
    }

    /// Keep at most `max` chats, pruning the oldest on create. 0 disables pruning.
    pub fn with_max_chats(mut self, max: u32) -> Self {
        self.max_chats = max;
        self
    }

    /// Store in the configured or platform data directory.
    pub fn open_default(config: &Config) -> Result<Self, HistoryError> {
        let dir = paths::data_dir(config).ok_or(HistoryError::NoDataDir)?;
        log::debug!("Chat history at {}", dir.display());
        Ok(Self::new(dir).with_max_chats(config.max_chats))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn chat_path(&self, id: &str) -> Result<PathBuf, HistoryError> {
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(HistoryError::InvalidInput("invalid chat id"));
        }
        Ok(self.root.join(format!("chat_{}.json", id)))
    }

    fn load_index(&self) -> Result<IndexFile, HistoryError> {
        read_json(&self.index_path())
    }

    fn save_index(&self, index: &IndexFile) -> Result<(), HistoryError> {
        write_json(&self.index_path(), index)
    }

    fn load_chat_file(&self, id: &str) -> Result<ChatFile, HistoryError> {
        read_json(&self.chat_path(id)?)
    }

    fn save_chat_file(&self, id: &str, file: &ChatFile) -> Result<(), HistoryError> {
        write_json(&self.chat_path(id)?, file)
    }

    fn remove_chat_file(&self, id: &str) -> Result<(), HistoryError> {
        match fs::remove_file(self.chat_path(id)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn find<'a>(index: &'a mut IndexFile, id: &str) -> Result<&'a mut Chat, HistoryError> {
        index
            .chats
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| HistoryError::ChatNotFound(id.to_string()))
    }
}

/// Read a JSON file. A missing file is the default value (first run).
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, HistoryError> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&data)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), HistoryError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

impl ChatStore for FileStore {
    fn create_chat(&self, name: &str) -> Result<Chat, HistoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HistoryError::InvalidInput("chat name cannot be empty"));
        }
        let _guard = self.guard();
        let mut index = self.load_index()?;
        let chat = Chat {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            timestamp: now_millis(),
        };
        index.chats.push(chat.clone());

        let mut ordered = index.chats.clone();
        index::sort_newest_first(&mut ordered);
        let pruned = index::prune(&mut ordered, self.max_chats);
        if !pruned.is_empty() {
            index.chats.retain(|c| !pruned.iter().any(|old| old.id == c.id));
        }
        for old in &pruned {
            if let Err(e) = self.remove_chat_file(&old.id) {
                log::warn!("Failed to remove chat file {}: {}", old.id, e);
            }
        }
        self.save_index(&index)?;
        log::debug!("Created chat {}", chat.id);
        Ok(chat)
    }

    fn get_chat(&self, id: &str) -> Result<Chat, HistoryError> {
        let mut index = self.load_index()?;
        Self::find(&mut index, id).cloned()
    }

    fn rename_chat(&self, id: &str, name: &str) -> Result<Chat, HistoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HistoryError::InvalidInput("chat name cannot be empty"));
        }
        let _guard = self.guard();
        let mut index = self.load_index()?;
        let chat = Self::find(&mut index, id)?;
        chat.name = name.to_string();
        let renamed = chat.clone();
        self.save_index(&index)?;
        Ok(renamed)
    }

    fn delete_chat(&self, id: &str) -> Result<(), HistoryError> {
        let _guard = self.guard();
        let mut index = self.load_index()?;
        Self::find(&mut index, id)?;
        index.chats.retain(|c| c.id != id);
        self.remove_chat_file(id)?;
        self.save_index(&index)?;
        log::debug!("Deleted chat {}", id);
        Ok(())
    }

    fn list_chats(&self) -> Result<Vec<Chat>, HistoryError> {
        let mut chats = self.load_index()?.chats;
        index::sort_newest_first(&mut chats);
        Ok(chats)
    }

    fn add_message(&self, message: &ChatMessage) -> Result<(), HistoryError> {
        let _guard = self.guard();
        let mut index = self.load_index()?;
        let chat = Self::find(&mut index, &message.chat_id)?;
        chat.timestamp = chat.timestamp.max(message.timestamp);

        let mut file = self.load_chat_file(&message.chat_id)?;
        file.messages.push(message.clone());
        self.save_chat_file(&message.chat_id, &file)?;
        self.save_index(&index)
    }

    fn messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        let mut index = self.load_index()?;
        Self::find(&mut index, chat_id)?;
        let mut messages = self.load_chat_file(chat_id)?.messages;
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), HistoryError> {
        let _guard = self.guard();
        let mut file = self.load_chat_file(chat_id)?;
        let before = file.messages.len();
        file.messages.retain(|m| m.id != message_id);
        if file.messages.len() == before {
            return Err(HistoryError::MessageNotFound(message_id.to_string()));
        }
        self.save_chat_file(chat_id, &file)
    }

    fn clear_messages(&self, chat_id: &str) -> Result<(), HistoryError> {
        let _guard = self.guard();
        let mut index = self.load_index()?;
        Self::find(&mut index, chat_id)?;
        self.save_chat_file(chat_id, &ChatFile::default())
    }
}
