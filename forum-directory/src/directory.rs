//! Contact directory and account records

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use forum_core::{
    Contact, ContactFilter, ContactUpdate, NewContact, Position, Role, User, UserId, Year,
};

use crate::error::DirectoryError;
use crate::hierarchy::DirectoryResult;
use crate::roles::RoleService;
use crate::store::{generate_contact_id, ContactStore, HierarchyStore, UserStore};

/// A rep placement requested together with a new contact
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPlacement {
    pub school_id: String,
    pub track_id: String,
    pub year: Year,
    #[serde(default)]
    pub has_been_elected: bool,
}

pub struct DirectoryService<H, C, U> {
    roles: RoleService<H, C>,
    contacts: Arc<C>,
    users: Arc<U>,
    admin_emails: Vec<String>,
}

impl<H, C, U> DirectoryService<H, C, U>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    pub fn new(
        roles: RoleService<H, C>,
        contacts: Arc<C>,
        users: Arc<U>,
        admin_emails: &[String],
    ) -> Self {
        Self {
            roles,
            contacts,
            users,
            admin_emails: admin_emails.iter().map(|e| e.trim().to_lowercase()).collect(),
        }
    }

    pub fn roles(&self) -> &RoleService<H, C> {
        &self.roles
    }

    /// Create the account record on first sign-in, refresh it afterwards
    pub fn record_sign_in(
        &self,
        uid: &UserId,
        email: &str,
        display_name: Option<String>,
    ) -> DirectoryResult<User> {
        let now = Utc::now();
        let is_admin = self.admin_emails.contains(&email.trim().to_lowercase());

        if let Some(mut user) = self.users.get_user(uid)? {
            self.users.touch_last_login(uid, now)?;
            user.last_login_at = now;
            if user.is_admin != is_admin {
                self.users.set_admin(uid, is_admin)?;
                tracing::info!(uid = %uid, is_admin, "Updated admin flag");
                user.is_admin = is_admin;
            }
            return Ok(user);
        }

        let user = User {
            uid: uid.clone(),
            email: email.to_string(),
            display_name: display_name.filter(|n| !n.trim().is_empty()),
            is_admin,
            created_at: now,
            last_login_at: now,
        };
        self.users.create_user(user.clone())?;
        tracing::info!(uid = %uid, is_admin = user.is_admin, "Created user record");
        Ok(user)
    }

    pub fn get_user(&self, uid: &UserId) -> DirectoryResult<Option<User>> {
        self.users.get_user(uid)
    }

    /// Let an admin create the organization with themselves as head.
    ///
    /// Also gives the head a contact record if they do not have one yet.
    /// Returns whether the organization was created by this call.
    pub fn bootstrap_organization(&self, actor: &UserId) -> DirectoryResult<bool> {
        let user = self
            .users
            .get_user(actor)?
            .ok_or(DirectoryError::NotAuthenticated)?;
        if !user.is_admin {
            return Err(DirectoryError::Forbidden);
        }

        let created = self.roles.initialize_user_role(actor, &user.email)?;
        if created && self.contacts.get_contact(actor)?.is_none() {
            self.contacts.create_contact(NewContact {
                id: Some(actor.clone()),
                name: user.display_name.clone().unwrap_or_else(|| user.email.clone()),
                email: Some(user.email.clone()),
                roles: vec![Role::head()],
                ..Default::default()
            })?;
        }
        Ok(created)
    }

    pub fn list_contacts(&self, filter: &ContactFilter) -> DirectoryResult<Vec<Contact>> {
        self.contacts.list_contacts(filter)
    }

    pub fn get_contact(&self, id: &UserId) -> DirectoryResult<Contact> {
        self.contacts
            .get_contact(id)?
            .ok_or_else(|| DirectoryError::NotFound(format!("contact {id}")))
    }

    pub fn create_contact(&self, contact: NewContact) -> DirectoryResult<Contact> {
        if contact.name.trim().is_empty() {
            return Err(DirectoryError::Validation("name is required".to_string()));
        }
        let created = self.contacts.create_contact(contact)?;
        tracing::info!(id = %created.id, "Created contact");
        Ok(created)
    }

    pub fn update_contact(&self, id: &UserId, update: ContactUpdate) -> DirectoryResult<Contact> {
        self.contacts.update_contact(id, update)
    }

    /// Delete a contact record. Hierarchy slots it held are left as they are.
    pub fn delete_contact(&self, id: &UserId) -> DirectoryResult<()> {
        self.contacts.delete_contact(id)?;
        tracing::info!(id = %id, "Deleted contact");
        Ok(())
    }

    /// Create a contact for a rep who has no account and place them in the
    /// hierarchy on behalf of `actor`.
    pub fn create_rep_contact(
        &self,
        actor: &UserId,
        contact: NewContact,
        placement: &RepPlacement,
    ) -> DirectoryResult<Contact> {
        let RepPlacement {
            school_id,
            track_id,
            year,
            has_been_elected,
        } = placement;

        if !self
            .roles
            .can_add_rep_to_position(actor, school_id, track_id, *year)?
        {
            return Err(DirectoryError::Forbidden);
        }
        if contact.name.trim().is_empty() {
            return Err(DirectoryError::Validation("name is required".to_string()));
        }

        let id = contact.id.clone().unwrap_or_else(generate_contact_id);
        if self.contacts.get_contact(&id)?.is_some() {
            return Err(DirectoryError::Validation(format!("contact {id} already exists")));
        }

        let hierarchy = self.roles.hierarchy();
        let reserved = !hierarchy.holds_rep_slot(school_id, track_id, *year, &id)?;
        if reserved {
            hierarchy.add_rep_to_track(school_id, track_id, *year, &id)?;
        }

        let coordinator_in_charge = match hierarchy.get_user_role(actor)? {
            Some(Position::Coordinator { .. }) => Some(actor.clone()),
            _ => hierarchy
                .get_organization_structure()?
                .and_then(|s| s.school(school_id).and_then(|c| c.user_id().cloned())),
        };
        let mut role = Role::rep(school_id, track_id, *year, *has_been_elected);
        role.coordinator_in_charge = coordinator_in_charge;

        let mut contact = contact;
        contact.id = Some(id.clone());
        contact.roles.retain(|r| !r.is_rep_slot(school_id, track_id, *year));
        contact.roles.push(role);

        match self.contacts.create_contact(contact) {
            Ok(created) => {
                tracing::info!(
                    id = %created.id,
                    actor = %actor,
                    school_id = %school_id,
                    track_id = %track_id,
                    year = %year,
                    "Created rep contact"
                );
                Ok(created)
            }
            Err(e) => {
                if reserved {
                    if let Err(release) =
                        hierarchy.remove_rep_from_track(school_id, track_id, *year, &id)
                    {
                        tracing::warn!(id = %id, error = %release, "Could not release rep slot");
                    }
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{HierarchyService, HierarchySettings};
    use crate::store::{InMemoryContactStore, InMemoryHierarchyStore, InMemoryUserStore};
    use forum_core::{Catalog, RoleType};

    type Service = DirectoryService<InMemoryHierarchyStore, InMemoryContactStore, InMemoryUserStore>;

    fn service() -> Service {
        let contacts = Arc::new(InMemoryContactStore::new());
        let hierarchy = HierarchyService::new(
            Arc::new(InMemoryHierarchyStore::new()),
            Arc::clone(&contacts),
            Arc::new(Catalog::builtin().unwrap()),
            HierarchySettings::default(),
        );
        let roles = RoleService::new(hierarchy, Arc::clone(&contacts));
        DirectoryService::new(
            roles,
            contacts,
            Arc::new(InMemoryUserStore::new()),
            &["Admin@Uni.ac.il".to_string()],
        )
    }

    fn placement(school: &str, track: &str, year: Year) -> RepPlacement {
        RepPlacement {
            school_id: school.to_string(),
            track_id: track.to_string(),
            year,
            has_been_elected: false,
        }
    }

    fn rep(name: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: "+972500000001".to_string(),
            track: "Computer Science".to_string(),
            year: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_sign_in_creates_then_refreshes() {
        let directory = service();
        let uid = UserId::from("admin");

        let first = directory
            .record_sign_in(&uid, "admin@uni.ac.il", Some("Admin".to_string()))
            .unwrap();
        assert!(first.is_admin);

        let second = directory.record_sign_in(&uid, "admin@uni.ac.il", None).unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert!(second.last_login_at >= first.last_login_at);

        let other = directory
            .record_sign_in(&"u2".into(), "student@uni.ac.il", None)
            .unwrap();
        assert!(!other.is_admin);

        let promoted = directory
            .record_sign_in(&"u2".into(), "ADMIN@uni.ac.il", None)
            .unwrap();
        assert!(promoted.is_admin);
        assert!(directory.get_user(&"u2".into()).unwrap().unwrap().is_admin);
    }

    #[test]
    fn test_bootstrap_requires_admin() {
        let directory = service();
        directory
            .record_sign_in(&"student".into(), "student@uni.ac.il", None)
            .unwrap();
        assert!(matches!(
            directory.bootstrap_organization(&"student".into()),
            Err(DirectoryError::Forbidden)
        ));
        assert!(matches!(
            directory.bootstrap_organization(&"stranger".into()),
            Err(DirectoryError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_bootstrap_creates_head_contact() {
        let directory = service();
        let uid = UserId::from("admin");
        directory
            .record_sign_in(&uid, "admin@uni.ac.il", Some("Noga".to_string()))
            .unwrap();

        assert!(directory.bootstrap_organization(&uid).unwrap());
        assert!(!directory.bootstrap_organization(&uid).unwrap());

        let contact = directory.get_contact(&uid).unwrap();
        assert_eq!(contact.name, "Noga");
        assert!(contact.has_role_type(&RoleType::Head));
    }

    #[test]
    fn test_coordinator_creates_rep_contact() {
        let directory = service();
        let roles = directory.roles();
        roles.initialize_user_role(&"U1".into(), "h@uni.ac.il").unwrap();
        roles.hierarchy().assign_coordinator("cs", Some("U2".into())).unwrap();

        let created = directory
            .create_rep_contact(&"U2".into(), rep("Yoav"), &placement("cs", "cs-track-0", Year::FIRST))
            .unwrap();

        assert_eq!(created.roles.len(), 1);
        assert_eq!(created.roles[0].coordinator_in_charge, Some(UserId::from("U2")));
        assert!(roles
            .hierarchy()
            .holds_rep_slot("cs", "cs-track-0", Year::FIRST, &created.id)
            .unwrap());
    }

    #[test]
    fn test_rep_contact_outside_own_school_is_forbidden() {
        let directory = service();
        let roles = directory.roles();
        roles.initialize_user_role(&"U1".into(), "h@uni.ac.il").unwrap();
        roles.hierarchy().assign_coordinator("cs", Some("U2".into())).unwrap();

        let result = directory.create_rep_contact(
            &"U2".into(),
            rep("Yoav"),
            &placement("law", "law-track-0", Year::FIRST),
        );
        assert!(matches!(result, Err(DirectoryError::Forbidden)));
        assert!(directory.list_contacts(&ContactFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_full_bucket_creates_no_contact() {
        let directory = service();
        directory
            .roles()
            .initialize_user_role(&"U1".into(), "h@uni.ac.il")
            .unwrap();
        let slot = placement("business", "business-track-2", Year::THIRD);
        for name in ["A", "B"] {
            directory.create_rep_contact(&"U1".into(), rep(name), &slot).unwrap();
        }

        let result = directory.create_rep_contact(&"U1".into(), rep("C"), &slot);
        assert!(matches!(
            result,
            Err(DirectoryError::Hierarchy(forum_core::Error::CapacityExceeded { .. }))
        ));
        assert_eq!(directory.list_contacts(&ContactFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_contact_id_reserves_nothing() {
        let directory = service();
        directory
            .roles()
            .initialize_user_role(&"U1".into(), "h@uni.ac.il")
            .unwrap();
        let mut first = rep("A");
        first.id = Some(UserId::from("taken"));
        directory.create_contact(first.clone()).unwrap();

        let slot = placement("cs", "cs-track-1", Year::FIRST);
        let result = directory.create_rep_contact(&"U1".into(), first, &slot);
        assert!(matches!(result, Err(DirectoryError::Validation(_))));
        assert!(!directory
            .roles()
            .hierarchy()
            .holds_rep_slot("cs", "cs-track-1", Year::FIRST, &"taken".into())
            .unwrap());
    }

    #[test]
    fn test_existing_contact_id_keeps_seated_rep() {
        let directory = service();
        let roles = directory.roles();
        roles.initialize_user_role(&"U1".into(), "h@uni.ac.il").unwrap();

        let mut seated = rep("Seated");
        seated.id = Some(UserId::from("rep"));
        directory.create_contact(seated.clone()).unwrap();
        roles
            .add_rep_role_to_user(&"rep".into(), "cs", "cs-track-0", Year::FIRST, false)
            .unwrap();

        let slot = placement("cs", "cs-track-0", Year::FIRST);
        let result = directory.create_rep_contact(&"U1".into(), seated, &slot);
        assert!(matches!(result, Err(DirectoryError::Validation(_))));

        let hierarchy = roles.hierarchy();
        assert!(hierarchy
            .holds_rep_slot("cs", "cs-track-0", Year::FIRST, &"rep".into())
            .unwrap());
        let structure = hierarchy.get_organization_structure().unwrap().unwrap();
        assert_eq!(
            structure.reps("cs", "cs-track-0", Year::FIRST).unwrap(),
            &[UserId::from("rep")]
        );
        let contact = directory.get_contact(&"rep".into()).unwrap();
        assert_eq!(contact.roles.len(), 1);
    }

    #[test]
    fn test_create_contact_requires_name() {
        let directory = service();
        let result = directory.create_contact(NewContact::default());
        assert!(matches!(result, Err(DirectoryError::Validation(_))));
    }
}
