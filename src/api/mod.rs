pub mod auth;
pub mod errors;
pub mod handlers;
pub mod routes;

use crate::services::ai::Orchestrator;
use crate::store::{ChatStore, MailboxStore, UserStore};

/// Shared application state handed to every handler.
pub struct AppState {
    pub mailbox: MailboxStore,
    pub chats: ChatStore,
    pub users: UserStore,
    pub sessions: auth::SessionStore,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            mailbox: MailboxStore::new(),
            chats: ChatStore::new(),
            users: UserStore::new(),
            sessions: auth::SessionStore::new(),
            orchestrator,
        }
    }
}
