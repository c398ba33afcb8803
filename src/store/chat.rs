//! Chat message collection. Append-only; history is read back per email in
//! chronological order.

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::ChatMessage;

#[derive(Debug, Default)]
pub struct ChatStore {
    messages: DashMap<Uuid, ChatMessage>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self { messages: DashMap::new() }
    }

    pub fn append(&self, message: ChatMessage) -> ChatMessage {
        self.messages.insert(message.id, message.clone());
        message
    }

    /// All messages for one email, oldest first.
    pub fn history(&self, email_id: Uuid) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|entry| entry.email_id == email_id)
            .map(|entry| entry.clone())
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }
}
