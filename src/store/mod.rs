//! In-process document store.
//!
//! Three collections backed by `DashMap`: emails, chat messages, users.
//! Email writes go through per-document optimistic concurrency (a version
//! counter checked on update) so two parties mutating the same record never
//! lose each other's membership-set changes.

pub mod chat;
pub mod mailbox;
pub mod users;

use thiserror::Error;

pub use chat::ChatStore;
pub use mailbox::MailboxStore;
pub use users::UserStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("version conflict on document {0}")]
    VersionConflict(String),
    #[error("duplicate key: {0}")]
    Duplicate(String),
}
