//! Mailbox Mutation Engine.
//!
//! State transitions on a single email: trash/restore, archive, star, read,
//! permanent delete with multi-party tracking, and the draft lifecycle.
//! Every write runs a bounded read-authorize-mutate-CAS loop so concurrent
//! writers (two recipients trashing at once) merge instead of clobbering
//! each other.

use log::{debug, warn};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::models::{ActionItem, Address, Email};
use crate::store::{MailboxStore, StoreError};

const CAS_RETRIES: usize = 8;

/// Draft fields for create/update. On update, `None` means "not provided,
/// keep the current value"; `Some` always overwrites, including empty
/// strings, so a field can be intentionally cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftChanges {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub recipients: Option<Vec<Address>>,
    pub parent_id: Option<Uuid>,
}

pub struct MutationEngine<'a> {
    store: &'a MailboxStore,
}

impl<'a> MutationEngine<'a> {
    pub fn new(store: &'a MailboxStore) -> Self {
        Self { store }
    }

    /// Core write loop: read a snapshot, authorize, apply `mutate`, CAS.
    /// `mutate` returns false to signal a no-op; idempotent transitions
    /// skip the write entirely.
    fn apply<F>(&self, id: Uuid, user: &str, mutate: F) -> Result<Email, ApiError>
    where
        F: Fn(&mut Email) -> Result<bool, ApiError>,
    {
        for attempt in 0..CAS_RETRIES {
            let (mut email, version) = self
                .store
                .get(id)
                .ok_or_else(|| ApiError::NotFound { resource: format!("Email {}", id) })?;

            if !email.has_access(user) {
                return Err(ApiError::Forbidden {
                    reason: "Not authorized to modify this email".to_string(),
                });
            }

            let changed = mutate(&mut email)?;
            if !changed {
                return Ok(email);
            }

            match self.store.update(id, version, email) {
                Ok(updated) => return Ok(updated),
                Err(StoreError::VersionConflict(_)) => {
                    debug!("Retrying mutation of {} after conflict (attempt {})", id, attempt + 1);
                    continue;
                }
                Err(e) => return Err(ApiError::StorageError { message: e.to_string() }),
            }
        }
        warn!("Gave up mutating email {} after {} conflicts", id, CAS_RETRIES);
        Err(ApiError::StorageError { message: format!("too much contention on email {}", id) })
    }

    /// Move to the caller's trash. Idempotent.
    pub fn trash(&self, id: Uuid, user: &str) -> Result<Email, ApiError> {
        self.apply(id, user, |email| Ok(email.trashed_by.insert(user.to_string())))
    }

    /// Take back out of the caller's trash. Idempotent.
    pub fn restore(&self, id: Uuid, user: &str) -> Result<Email, ApiError> {
        self.apply(id, user, |email| Ok(email.trashed_by.remove(user)))
    }

    /// Archive. Idempotent; there is no unarchive operation.
    pub fn archive(&self, id: Uuid, user: &str) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            let changed = !email.archived;
            email.archived = true;
            Ok(changed)
        })
    }

    pub fn set_starred(&self, id: Uuid, user: &str, value: bool) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            let changed = email.starred != value;
            email.starred = value;
            Ok(changed)
        })
    }

    pub fn set_read(&self, id: Uuid, user: &str, value: bool) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            let changed = email.read != value;
            email.read = value;
            Ok(changed)
        })
    }

    /// Record the caller's permanent delete. Once every party with access
    /// has done so, the record is physically removed from the store.
    pub fn permanently_delete(&self, id: Uuid, user: &str) -> Result<(), ApiError> {
        let email = self.apply(id, user, |email| {
            Ok(email.permanently_deleted_by.insert(user.to_string()))
        })?;
        if email.fully_deleted() {
            self.store.remove(id);
        }
        Ok(())
    }

    /// Overwrite an email's action items, defaulting `completed` to false.
    pub fn save_action_items(&self, id: Uuid, user: &str, items: Vec<ActionItem>) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            email.action_items = items.clone();
            Ok(true)
        })
    }

    /// Attach an AI-drafted reply to an email.
    pub fn save_draft_reply(
        &self,
        id: Uuid,
        user: &str,
        reply: crate::models::DraftReply,
    ) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            email.draft_reply = Some(reply.clone());
            Ok(true)
        })
    }

    pub fn set_category(
        &self,
        id: Uuid,
        user: &str,
        category: crate::models::Category,
    ) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            email.category = Some(category.clone());
            Ok(true)
        })
    }

    // --- Draft lifecycle ------------------------------------------------

    fn require_own_draft(email: &Email, user: &str) -> Result<(), ApiError> {
        if !email.is_sender(user) {
            return Err(ApiError::Forbidden {
                reason: "Not authorized to modify this draft".to_string(),
            });
        }
        if !email.is_draft {
            return Err(ApiError::BadRequest { message: "Email is not a draft".to_string() });
        }
        Ok(())
    }

    pub fn create_draft(&self, sender: Address, changes: DraftChanges) -> Email {
        let mut draft = Email::new_draft(
            sender,
            changes.recipients.unwrap_or_default(),
            changes.subject.unwrap_or_else(|| "(No subject)".to_string()),
            changes.body.unwrap_or_default(),
        );
        draft.parent_id = changes.parent_id;
        self.store.insert(draft)
    }

    pub fn update_draft(&self, id: Uuid, user: &str, changes: &DraftChanges) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            Self::require_own_draft(email, user)?;
            if let Some(subject) = &changes.subject {
                email.subject = subject.clone();
            }
            if let Some(body) = &changes.body {
                email.body = body.clone();
            }
            if let Some(recipients) = &changes.recipients {
                email.recipients = recipients.clone();
            }
            if let Some(parent_id) = changes.parent_id {
                email.parent_id = Some(parent_id);
            }
            Ok(true)
        })
    }

    /// Promote a draft to a sent email. The timestamp is refreshed so the
    /// message sorts as new mail in the recipients' inboxes.
    pub fn send_draft(&self, id: Uuid, user: &str) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            Self::require_own_draft(email, user)?;
            email.is_draft = false;
            email.timestamp = chrono::Utc::now();
            Ok(true)
        })
    }

    /// Discard a draft into the owner's trash.
    pub fn delete_draft(&self, id: Uuid, user: &str) -> Result<Email, ApiError> {
        self.apply(id, user, |email| {
            Self::require_own_draft(email, user)?;
            Ok(email.trashed_by.insert(user.to_string()))
        })
    }
}
