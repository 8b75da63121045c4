//! In-memory message store used to rebuild conversation history.
//!
//! Messages link to their predecessor through `parent_message_id`; walking that
//! chain from the newest message yields the conversation so far. The store is
//! an LRU cache, so abandoned conversations age out.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl StoredMessage {
    pub fn user(
        id: impl Into<String>,
        text: impl Into<String>,
        parent_message_id: Option<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::User,
            text: text.into(),
            parent_message_id,
            conversation_id,
        }
    }

    pub fn assistant(
        id: impl Into<String>,
        text: impl Into<String>,
        parent_message_id: Option<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            text: text.into(),
            parent_message_id,
            conversation_id,
        }
    }
}

/// Messages kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 1000;

pub struct ConversationStore {
    messages: Mutex<LruCache<String, StoredMessage>>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `capacity` messages (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            messages: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, StoredMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a message, evicting the least recently used one when full.
    pub fn insert(&self, message: StoredMessage) {
        self.lock().put(message.id.clone(), message);
    }

    pub fn get(&self, id: &str) -> Option<StoredMessage> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Messages ending at `last_id`, oldest first, within `char_budget` characters.
    ///
    /// Walks parent links from `last_id`; stops at the first message that would
    /// exceed the budget or at a missing link.
    pub fn history(&self, last_id: &str, char_budget: usize) -> Vec<StoredMessage> {
        let mut messages = self.lock();
        let mut chain = Vec::new();
        let mut used = 0usize;
        let mut next = Some(last_id.to_string());

        while let Some(id) = next {
            // `get` also marks the message as recently used
            let Some(message) = messages.get(&id).cloned() else {
                break;
            };
            let size = message.text.chars().count();
            if used + size > char_budget {
                break;
            }
            used += size;
            next = message.parent_message_id.clone();
            chain.push(message);

            // Guards against a cycle in corrupted links.
            if chain.len() > messages.len() {
                break;
            }
        }

        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> ConversationStore {
        let store = ConversationStore::new();
        store.insert(StoredMessage::user("u1", "first question", None, Some("c".into())));
        store.insert(StoredMessage::assistant("a1", "first answer", Some("u1".into()), Some("c".into())));
        store.insert(StoredMessage::user("u2", "second question", Some("a1".into()), Some("c".into())));
        store.insert(StoredMessage::assistant("a2", "second answer", Some("u2".into()), Some("c".into())));
        store
    }

    #[test]
    fn test_history_oldest_first() {
        let store = seeded_store();
        let ids: Vec<_> = store.history("a2", 10_000).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["u1", "a1", "u2", "a2"]);
    }

    #[test]
    fn test_history_respects_budget() {
        let store = seeded_store();
        // "second answer" (13) + "second question" (15) fit, "first answer" does not
        let ids: Vec<_> = store.history("a2", 30).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["u2", "a2"]);
    }

    #[test]
    fn test_history_unknown_id_is_empty() {
        let store = seeded_store();
        assert!(store.history("missing", 10_000).is_empty());
    }

    #[test]
    fn test_history_stops_at_cycle() {
        let store = ConversationStore::new();
        store.insert(StoredMessage::user("x", "a", Some("y".into()), None));
        store.insert(StoredMessage::assistant("y", "b", Some("x".into()), None));
        assert!(store.history("x", 10_000).len() <= 3);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let store = ConversationStore::with_capacity(3);
        for i in 0..50 {
            store.insert(StoredMessage::user(format!("u{}", i), "q", None, None));
        }
        assert_eq!(store.len(), 3);
        assert!(store.get("u0").is_none());
        assert!(store.get("u49").is_some());
    }

    #[test]
    fn test_history_walk_keeps_chain_alive() {
        let store = ConversationStore::with_capacity(3);
        store.insert(StoredMessage::user("u1", "q", None, None));
        store.insert(StoredMessage::assistant("a1", "r", Some("u1".into()), None));
        store.insert(StoredMessage::user("other", "x", None, None));

        // touching the chain makes "other" the eviction candidate
        assert_eq!(store.history("a1", 100).len(), 2);
        store.insert(StoredMessage::user("u2", "q2", Some("a1".into()), None));

        assert!(store.get("other").is_none());
        assert!(store.get("u1").is_some());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        assert_eq!(ConversationStore::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn test_clear() {
        let store = seeded_store();
        assert_eq!(store.len(), 4);
        store.clear();
        assert!(store.is_empty());
    }
}
