//! Chat list helpers: titles, ordering, search.

use std::collections::HashMap;

use super::Chat;

const TITLE_CHARS: usize = 30;

/// Chat name derived from its first message: the first 30 characters, with `...`
/// appended when the message is longer. Blank input gives "New chat".
pub fn chat_title(first_message: &str) -> String {
    let s = first_message.trim().replace('\n', " ");
    if s.is_empty() {
        return "New chat".to_string();
    }
    if s.chars().count() <= TITLE_CHARS {
        return s;
    }
    let truncated: String = s.chars().take(TITLE_CHARS).collect();
    format!("{}...", truncated)
}

/// Sort a creation-ordered list newest first. Among equal timestamps the later-created
/// chat comes first.
pub fn sort_newest_first(chats: &mut [Chat]) {
    chats.reverse();
    chats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// The chat with the latest activity, if any. Ties go to the earlier entry, so a
/// newest-first list yields its head.
pub fn most_recent(chats: &[Chat]) -> Option<&Chat> {
    chats.iter().rev().max_by_key(|c| c.timestamp)
}

/// Filter chats by name, id, or message content (case-insensitive).
pub fn filter_chats<'a>(
    chats: &'a [Chat],
    query: &str,
    content_by_id: &HashMap<String, String>,
) -> Vec<&'a Chat> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return chats.iter().collect();
    }
    chats
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&q)
                || c.id.to_lowercase().contains(&q)
                || content_by_id
                    .get(&c.id)
                    .map(|s| s.to_lowercase().contains(&q))
                    .unwrap_or(false)
        })
        .collect()
}

/// Split off the chats beyond `max`. `chats` must already be sorted newest first.
/// A `max` of 0 keeps everything.
pub(super) fn prune(chats: &mut Vec<Chat>, max: u32) -> Vec<Chat> {
    let max = max as usize;
    if max == 0 || chats.len() <= max {
        return Vec::new();
    }
    chats.drain(max..).collect()
}
