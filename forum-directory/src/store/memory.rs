//! In-memory storage implementations

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use forum_core::{
    Contact, ContactFilter, ContactUpdate, NewContact, OrganizationStructure, User, UserId,
};

use super::{
    generate_contact_id, sort_by_name, ContactStore, HierarchyStore, StoreResult, UserStore,
    Versioned,
};
use crate::error::DirectoryError;

/// In-memory organization structure
pub struct InMemoryHierarchyStore {
    structure: RwLock<Option<Versioned<OrganizationStructure>>>,
}

impl InMemoryHierarchyStore {
    pub fn new() -> Self {
        Self {
            structure: RwLock::new(None),
        }
    }
}

impl Default for InMemoryHierarchyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyStore for InMemoryHierarchyStore {
    fn load_structure(&self) -> StoreResult<Option<Versioned<OrganizationStructure>>> {
        Ok(self.structure.read().unwrap().clone())
    }

    fn replace_structure(&self, structure: &OrganizationStructure) -> StoreResult<u64> {
        let mut slot = self.structure.write().unwrap();
        let version = slot.as_ref().map_or(1, |s| s.version + 1);
        *slot = Some(Versioned {
            version,
            value: structure.clone(),
        });
        Ok(version)
    }

    fn swap_structure(
        &self,
        structure: &OrganizationStructure,
        expected: Option<u64>,
    ) -> StoreResult<u64> {
        let mut slot = self.structure.write().unwrap();
        let current = slot.as_ref().map(|s| s.version);
        if current != expected {
            return Err(DirectoryError::VersionConflict);
        }
        let version = current.map_or(1, |v| v + 1);
        *slot = Some(Versioned {
            version,
            value: structure.clone(),
        });
        Ok(version)
    }
}

/// In-memory contact records
pub struct InMemoryContactStore {
    contacts: RwLock<HashMap<UserId, Contact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore for InMemoryContactStore {
    fn create_contact(&self, contact: NewContact) -> StoreResult<Contact> {
        let id = contact.id.clone().unwrap_or_else(generate_contact_id);
        let mut contacts = self.contacts.write().unwrap();
        if contacts.contains_key(&id) {
            return Err(DirectoryError::Validation(format!(
                "contact {id} already exists"
            )));
        }
        let contact = contact.into_contact(id.clone(), Utc::now());
        contacts.insert(id, contact.clone());
        Ok(contact)
    }

    fn get_contact(&self, id: &UserId) -> StoreResult<Option<Contact>> {
        Ok(self.contacts.read().unwrap().get(id).cloned())
    }

    fn update_contact(&self, id: &UserId, update: ContactUpdate) -> StoreResult<Contact> {
        let mut contacts = self.contacts.write().unwrap();
        let contact = contacts
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(format!("contact {id}")))?;
        update.apply(contact, Utc::now());
        Ok(contact.clone())
    }

    fn delete_contact(&self, id: &UserId) -> StoreResult<()> {
        self.contacts.write().unwrap().remove(id);
        Ok(())
    }

    fn list_contacts(&self, filter: &ContactFilter) -> StoreResult<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self
            .contacts
            .read()
            .unwrap()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        sort_by_name(&mut contacts);
        Ok(contacts)
    }
}

/// In-memory user accounts
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryUserStore {
    fn get_user(&self, uid: &UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(uid).cloned())
    }

    fn create_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.uid) {
            return Err(DirectoryError::Validation(format!(
                "user {} already exists",
                user.uid
            )));
        }
        users.insert(user.uid.clone(), user);
        Ok(())
    }

    fn touch_last_login(&self, uid: &UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(uid)
            .ok_or_else(|| DirectoryError::NotFound(format!("user {uid}")))?;
        user.last_login_at = at;
        Ok(())
    }

    fn set_admin(&self, uid: &UserId, is_admin: bool) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(uid)
            .ok_or_else(|| DirectoryError::NotFound(format!("user {uid}")))?;
        user.is_admin = is_admin;
        Ok(())
    }
}
