//! Per-email chat assistant.
//!
//! Each exchange persists a user/assistant message pair against the email it
//! discusses, so the conversation survives page reloads. The assistant sees
//! the email's subject and body as context.

use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::models::{ChatMessage, ChatRole};
use crate::services::ai::Orchestrator;
use crate::store::{ChatStore, MailboxStore};

pub struct ChatService<'a> {
    mailbox: &'a MailboxStore,
    chats: &'a ChatStore,
    orchestrator: &'a Orchestrator,
}

impl<'a> ChatService<'a> {
    pub fn new(mailbox: &'a MailboxStore, chats: &'a ChatStore, orchestrator: &'a Orchestrator) -> Self {
        Self { mailbox, chats, orchestrator }
    }

    /// Send one chat message about `email_id` and return the assistant's
    /// reply. Both sides of the exchange are persisted.
    pub async fn send_message(&self, email_id: Uuid, message: &str) -> Result<ChatMessage, ApiError> {
        let (email, _) = self
            .mailbox
            .get(email_id)
            .ok_or_else(|| ApiError::NotFound { resource: format!("Email {}", email_id) })?;

        self.chats.append(ChatMessage::new(email_id, ChatRole::User, message));

        let response = self
            .orchestrator
            .chat_respond(message, &email.subject, &email.body)
            .await;
        Ok(self.chats.append(ChatMessage::new(email_id, ChatRole::Assistant, response)))
    }

    /// Full conversation for one email, oldest first.
    pub fn history(&self, email_id: Uuid) -> Vec<ChatMessage> {
        self.chats.history(email_id)
    }
}
