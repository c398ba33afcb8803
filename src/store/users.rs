//! User collection. Email addresses are unique across accounts.

use dashmap::DashMap;
use log::debug;
use uuid::Uuid;

use super::StoreError;
use crate::models::User;

#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<Uuid, User>,
    // Secondary index: email -> user id.
    by_email: DashMap<String, Uuid>,
}

impl UserStore {
    pub fn new() -> Self {
        Self { users: DashMap::new(), by_email: DashMap::new() }
    }

    pub fn insert(&self, user: User) -> Result<User, StoreError> {
        use dashmap::mapref::entry::Entry;
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(user.email.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                debug!("Registered user {} ({})", user.email, user.id);
                Ok(user)
            }
        }
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.by_email.get(email)?;
        self.find_by_id(id)
    }

    /// Replace a user record, keeping the email index consistent. Fails when
    /// the new email already belongs to another account.
    pub fn update(&self, user: User) -> Result<User, StoreError> {
        let current = self
            .find_by_id(user.id)
            .ok_or_else(|| StoreError::NotFound(user.id.to_string()))?;

        if current.email != user.email {
            if self.by_email.contains_key(&user.email) {
                return Err(StoreError::Duplicate(user.email.clone()));
            }
            self.by_email.remove(&current.email);
            self.by_email.insert(user.email.clone(), user.id);
        }

        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}
