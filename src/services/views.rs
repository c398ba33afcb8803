//! Visibility Filter Engine.
//!
//! Each mailbox view is a predicate over the shared email collection for a
//! given user, plus a sort order. Every view except Thread sorts newest
//! first; threads read top to bottom chronologically.

use log::debug;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::models::{Category, Email};
use crate::store::MailboxStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Inbox,
    Sent,
    Drafts,
    Trash,
    Starred,
    Newsletter,
    Spam,
    Todo,
}

impl View {
    /// Whether `email` belongs to this view for `user`.
    pub fn matches(self, email: &Email, user: &str) -> bool {
        // Trash is the only view that shows trashed mail, and nothing a user
        // has permanently deleted is ever visible to them.
        if email.permanently_deleted_by.contains(user) {
            return false;
        }
        let trashed = email.trashed_by.contains(user);

        match self {
            View::Inbox => {
                email.is_recipient(user) && !email.is_draft && !email.archived && !trashed
            }
            View::Sent => email.is_sender(user) && !email.is_draft && !trashed,
            View::Drafts => email.is_sender(user) && email.is_draft && !trashed,
            View::Trash => email.has_access(user) && trashed,
            View::Starred => email.has_access(user) && email.starred && !trashed,
            View::Newsletter => Self::category_view(email, user, trashed, &Category::Newsletter),
            View::Spam => Self::category_view(email, user, trashed, &Category::Spam),
            View::Todo => Self::category_view(email, user, trashed, &Category::ToDo),
        }
    }

    fn category_view(email: &Email, user: &str, trashed: bool, wanted: &Category) -> bool {
        email.has_access(user) && !trashed && email.category.as_ref() == Some(wanted)
    }
}

/// List the emails a user sees in `view`, newest first. `parent_id` narrows
/// Sent and Drafts to a single thread; other views ignore it.
pub fn list_view(
    store: &MailboxStore,
    view: View,
    user: &str,
    parent_id: Option<Uuid>,
) -> Vec<Email> {
    let mut emails = store.scan(|email| {
        if !view.matches(email, user) {
            return false;
        }
        match (view, parent_id) {
            (View::Sent | View::Drafts, Some(parent)) => email.parent_id == Some(parent),
            _ => true,
        }
    });
    emails.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    debug!("View {:?} for {}: {} emails", view, user, emails.len());
    emails
}

/// Fetch one email with access enforcement.
///
/// Unknown ids are NotFound. A party that is neither sender nor recipient
/// gets Forbidden. A party that permanently deleted the email gets NotFound
/// so the record's continued existence stays hidden.
pub fn fetch_authorized(store: &MailboxStore, id: Uuid, user: &str) -> Result<Email, ApiError> {
    let (email, _) = store
        .get(id)
        .ok_or_else(|| ApiError::NotFound { resource: format!("Email {}", id) })?;

    if !email.has_access(user) {
        return Err(ApiError::Forbidden {
            reason: "Not authorized to access this email".to_string(),
        });
    }
    if email.permanently_deleted_by.contains(user) {
        return Err(ApiError::NotFound { resource: format!("Email {}", id) });
    }
    Ok(email)
}

/// Assemble the thread around one email: the anchor itself, its direct
/// replies, its parent, and the parent's other replies. Chronological order.
pub fn thread_of(store: &MailboxStore, anchor_id: Uuid) -> Result<Vec<Email>, ApiError> {
    let (anchor, _) = store
        .get(anchor_id)
        .ok_or_else(|| ApiError::NotFound { resource: format!("Email {}", anchor_id) })?;
    let parent = anchor.parent_id;

    let mut emails = store.scan(|email| {
        if email.deleted {
            return false;
        }
        email.id == anchor_id
            || email.parent_id == Some(anchor_id)
            || Some(email.id) == parent
            || (parent.is_some() && email.parent_id == parent)
    });
    emails.sort_by_key(|e| e.timestamp);
    Ok(emails)
}
