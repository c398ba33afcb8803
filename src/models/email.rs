//! Email document model.
//!
//! An `Email` doubles as a draft (`is_draft`) and carries per-user trash and
//! permanent-delete markers, so a single record serves every party's mailbox
//! views. Field names on the wire stay camelCase for frontend compatibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// A mailbox participant: display name plus address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl Address {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

/// Validated email category.
///
/// Provider output that matches none of the known labels is preserved in
/// `Unrecognized` instead of being accepted silently as free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Important,
    Newsletter,
    Spam,
    ToDo,
    Unrecognized(String),
}

impl Category {
    /// Parse a provider label, tolerating case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "important" => Category::Important,
            "newsletter" => Category::Newsletter,
            "spam" => Category::Spam,
            "to-do" | "todo" | "to do" => Category::ToDo,
            _ => Category::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Important => "Important",
            Category::Newsletter => "Newsletter",
            Category::Spam => "Spam",
            Category::ToDo => "To-Do",
            Category::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::parse(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A single actionable item extracted from an email body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub action_required: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_needed: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// AI-generated reply attached to an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReply {
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub sender: Address,
    #[serde(default)]
    pub recipients: Vec<Address>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_reply: Option<DraftReply>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Emails of users who moved this message to their trash.
    #[serde(default)]
    pub trashed_by: BTreeSet<String>,
    /// Emails of users who permanently deleted this message. The record is
    /// physically removed once this covers the sender and every recipient.
    #[serde(default)]
    pub permanently_deleted_by: BTreeSet<String>,
}

impl Email {
    /// New outbound message from `sender` to `recipients`.
    pub fn new(sender: Address, recipients: Vec<Address>, subject: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipients,
            subject,
            body,
            timestamp: Utc::now(),
            category: None,
            priority: None,
            action_items: Vec::new(),
            draft_reply: None,
            read: false,
            starred: false,
            archived: false,
            deleted: false,
            is_draft: false,
            labels: Vec::new(),
            parent_id: None,
            trashed_by: BTreeSet::new(),
            permanently_deleted_by: BTreeSet::new(),
        }
    }

    /// New draft. Drafts start read so they never show as unread mail.
    pub fn new_draft(sender: Address, recipients: Vec<Address>, subject: String, body: String) -> Self {
        let mut email = Self::new(sender, recipients, subject, body);
        email.is_draft = true;
        email.read = true;
        email
    }

    pub fn is_sender(&self, user_email: &str) -> bool {
        self.sender.email == user_email
    }

    pub fn is_recipient(&self, user_email: &str) -> bool {
        self.recipients.iter().any(|r| r.email == user_email)
    }

    /// Whether `user_email` is a party to this email at all.
    pub fn has_access(&self, user_email: &str) -> bool {
        self.is_sender(user_email) || self.is_recipient(user_email)
    }

    /// Every address with standing on this email: sender plus recipients.
    pub fn access_set(&self) -> BTreeSet<&str> {
        std::iter::once(self.sender.email.as_str())
            .chain(self.recipients.iter().map(|r| r.email.as_str()))
            .collect()
    }

    /// True once every access holder has permanently deleted the email.
    pub fn fully_deleted(&self) -> bool {
        self.access_set()
            .iter()
            .all(|addr| self.permanently_deleted_by.contains(*addr))
    }
}
