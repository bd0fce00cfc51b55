//! Storage abstractions for the directory
//!
//! Three collections back the service: the organization structure singleton,
//! contact records and user accounts. Each has an in-memory and a SQLite
//! implementation.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};

use forum_core::{Contact, ContactFilter, ContactUpdate, NewContact, OrganizationStructure, User, UserId};

use crate::error::DirectoryError;

pub use memory::{InMemoryContactStore, InMemoryHierarchyStore, InMemoryUserStore};
pub use sqlite::SqliteStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, DirectoryError>;

/// A stored value together with its write version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Trait for the organization structure singleton
pub trait HierarchyStore: Send + Sync {
    /// Load the structure, or `None` if it was never initialized
    fn load_structure(&self) -> StoreResult<Option<Versioned<OrganizationStructure>>>;

    /// Overwrite the structure unconditionally, returning the new version
    fn replace_structure(&self, structure: &OrganizationStructure) -> StoreResult<u64>;

    /// Write the structure only if the stored version still equals `expected`
    /// (`None` meaning "not yet stored"). Fails with
    /// `DirectoryError::VersionConflict` otherwise.
    fn swap_structure(
        &self,
        structure: &OrganizationStructure,
        expected: Option<u64>,
    ) -> StoreResult<u64>;
}

/// Trait for contact ("job holder") records
pub trait ContactStore: Send + Sync {
    /// Create a contact, keyed by `contact.id` or a freshly generated id
    fn create_contact(&self, contact: NewContact) -> StoreResult<Contact>;

    /// Get a contact by ID
    fn get_contact(&self, id: &UserId) -> StoreResult<Option<Contact>>;

    /// Apply a partial update and bump `updated_at`
    fn update_contact(&self, id: &UserId, update: ContactUpdate) -> StoreResult<Contact>;

    /// Delete a contact; deleting a missing contact is not an error
    fn delete_contact(&self, id: &UserId) -> StoreResult<()>;

    /// List contacts matching `filter`, ordered by name
    fn list_contacts(&self, filter: &ContactFilter) -> StoreResult<Vec<Contact>>;
}

/// Trait for authenticated user accounts
pub trait UserStore: Send + Sync {
    /// Get a user by ID
    fn get_user(&self, uid: &UserId) -> StoreResult<Option<User>>;

    /// Insert a new user record
    fn create_user(&self, user: User) -> StoreResult<()>;

    /// Record a sign-in
    fn touch_last_login(&self, uid: &UserId, at: DateTime<Utc>) -> StoreResult<()>;

    /// Grant or revoke the admin flag
    fn set_admin(&self, uid: &UserId, is_admin: bool) -> StoreResult<()>;
}

/// Generate an id for a contact created without an account
pub(crate) fn generate_contact_id() -> UserId {
    UserId(uuid::Uuid::new_v4().simple().to_string())
}

/// Sort contacts the way the directory lists them
pub(crate) fn sort_by_name(contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}
