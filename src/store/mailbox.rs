//! Email collection with per-document versioning.

use dashmap::DashMap;
use log::debug;
use uuid::Uuid;

use super::StoreError;
use crate::models::Email;

#[derive(Debug, Clone)]
struct Versioned {
    doc: Email,
    version: u64,
}

/// Concurrent email collection. Reads hand out a snapshot plus the version
/// it was taken at; updates must present that version back.
#[derive(Debug, Default)]
pub struct MailboxStore {
    emails: DashMap<Uuid, Versioned>,
}

impl MailboxStore {
    pub fn new() -> Self {
        Self { emails: DashMap::new() }
    }

    pub fn insert(&self, email: Email) -> Email {
        let id = email.id;
        self.emails.insert(id, Versioned { doc: email.clone(), version: 0 });
        debug!("Stored email {}", id);
        email
    }

    /// Snapshot of a document together with its current version.
    pub fn get(&self, id: Uuid) -> Option<(Email, u64)> {
        self.emails.get(&id).map(|entry| (entry.doc.clone(), entry.version))
    }

    /// Compare-and-swap update. Fails with `VersionConflict` when another
    /// writer got in between the caller's read and this write.
    pub fn update(&self, id: Uuid, expected_version: u64, doc: Email) -> Result<Email, StoreError> {
        let mut entry = self
            .emails
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if entry.version != expected_version {
            debug!(
                "Version conflict on email {}: expected {}, found {}",
                id, expected_version, entry.version
            );
            return Err(StoreError::VersionConflict(id.to_string()));
        }
        entry.doc = doc.clone();
        entry.version += 1;
        Ok(doc)
    }

    pub fn remove(&self, id: Uuid) -> Option<Email> {
        self.emails.remove(&id).map(|(_, v)| {
            debug!("Physically removed email {}", id);
            v.doc
        })
    }

    /// All documents matching `predicate`, in unspecified order. Callers
    /// sort per view.
    pub fn scan<F>(&self, predicate: F) -> Vec<Email>
    where
        F: Fn(&Email) -> bool,
    {
        self.emails
            .iter()
            .filter(|entry| predicate(&entry.doc))
            .map(|entry| entry.doc.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn email() -> Email {
        Email::new(
            Address::new("Alice", "alice@example.com"),
            vec![Address::new("Bob", "bob@example.com")],
            "Hello".to_string(),
            "World".to_string(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let store = MailboxStore::new();
        let stored = store.insert(email());
        let (found, version) = store.get(stored.id).unwrap();
        assert_eq!(found.subject, "Hello");
        assert_eq!(version, 0);
    }

    #[test]
    fn test_update_bumps_version() {
        let store = MailboxStore::new();
        let stored = store.insert(email());
        let (mut doc, version) = store.get(stored.id).unwrap();
        doc.read = true;
        store.update(stored.id, version, doc).unwrap();
        let (found, version) = store.get(stored.id).unwrap();
        assert!(found.read);
        assert_eq!(version, 1);
    }

    #[test]
    fn test_stale_update_is_rejected() {
        let store = MailboxStore::new();
        let stored = store.insert(email());
        let (doc, version) = store.get(stored.id).unwrap();

        // A competing writer lands first.
        let mut other = doc.clone();
        other.starred = true;
        store.update(stored.id, version, other).unwrap();

        let mut stale = doc;
        stale.read = true;
        let err = store.update(stored.id, version, stale).unwrap_err();
        assert_eq!(err, StoreError::VersionConflict(stored.id.to_string()));

        // The first write survived.
        let (found, _) = store.get(stored.id).unwrap();
        assert!(found.starred);
        assert!(!found.read);
    }

    #[test]
    fn test_remove() {
        let store = MailboxStore::new();
        let stored = store.insert(email());
        assert!(store.remove(stored.id).is_some());
        assert!(store.get(stored.id).is_none());
    }

    #[test]
    fn test_scan_filters() {
        let store = MailboxStore::new();
        store.insert(email());
        let mut starred = email();
        starred.starred = true;
        store.insert(starred);

        let found = store.scan(|e| e.starred);
        assert_eq!(found.len(), 1);
        assert!(found[0].starred);
    }
}
