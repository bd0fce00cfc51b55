//! Role resolution and role assignment
//!
//! Roles live in two places: the organization structure and each contact's
//! role list. Assignments write both, hierarchy first. The two writes are not
//! transactional; if the second one fails the stores disagree until the next
//! successful assignment or removal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use forum_core::{
    ContactUpdate, CoordinatorOpening, DashboardSummary, Position, RepOpening, Role, RoleType,
    UserId, Year,
};

use crate::error::DirectoryError;
use crate::hierarchy::{DirectoryResult, HierarchyService};
use crate::store::{ContactStore, HierarchyStore};

/// Open positions a user is allowed to fill
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedPositions {
    pub coordinator_positions: Vec<CoordinatorOpening>,
    pub rep_positions: Vec<RepOpening>,
}

/// Which slots a role removal targets
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRemoval {
    pub role_type: RoleType,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub year: Option<Year>,
}

pub struct RoleService<H, C> {
    hierarchy: HierarchyService<H, C>,
    contacts: Arc<C>,
}

impl<H, C> Clone for RoleService<H, C> {
    fn clone(&self) -> Self {
        Self {
            hierarchy: self.hierarchy.clone(),
            contacts: Arc::clone(&self.contacts),
        }
    }
}

impl<H, C> RoleService<H, C>
where
    H: HierarchyStore,
    C: ContactStore,
{
    pub fn new(hierarchy: HierarchyService<H, C>, contacts: Arc<C>) -> Self {
        Self {
            hierarchy,
            contacts,
        }
    }

    pub fn hierarchy(&self) -> &HierarchyService<H, C> {
        &self.hierarchy
    }

    /// Bootstrap the organization with `user` as head if it does not exist
    /// yet. Returns whether this call created it.
    pub fn initialize_user_role(&self, user: &UserId, email: &str) -> DirectoryResult<bool> {
        let created = self.hierarchy.initialize_if_absent(user)?;
        if created {
            tracing::info!(user = %user, email, "Bootstrapped organization with first head");
        }
        Ok(created)
    }

    /// Every position `user` holds, unlike `get_user_role` which stops at the first
    pub fn get_all_user_roles(&self, user: &UserId) -> DirectoryResult<Vec<Position>> {
        self.hierarchy.get_all_positions(user)
    }

    pub fn get_user_dashboard_type(&self, user: &UserId) -> DirectoryResult<DashboardSummary> {
        Ok(DashboardSummary::from_positions(self.get_all_user_roles(user)?))
    }

    /// Only the head may seat coordinators
    pub fn can_add_coordinator(&self, user: &UserId) -> DirectoryResult<bool> {
        Ok(matches!(
            self.hierarchy.get_user_role(user)?,
            Some(Position::Head)
        ))
    }

    /// The head may place reps anywhere, a coordinator anywhere in their own
    /// school. Track and year do not restrict a coordinator.
    pub fn can_add_rep_to_position(
        &self,
        user: &UserId,
        school_id: &str,
        _track_id: &str,
        _year: Year,
    ) -> DirectoryResult<bool> {
        Ok(match self.hierarchy.get_user_role(user)? {
            Some(Position::Head) => true,
            Some(Position::Coordinator { school_id: own }) => own == school_id,
            _ => false,
        })
    }

    /// Place `user` in a rep bucket and record the role on their contact.
    ///
    /// Calling this again for the same slot changes nothing. A missing
    /// contact record is logged and otherwise ignored.
    pub fn add_rep_role_to_user(
        &self,
        user: &UserId,
        school_id: &str,
        track_id: &str,
        year: Year,
        has_been_elected: bool,
    ) -> DirectoryResult<()> {
        let occupancy = self.hierarchy.settings().occupancy;
        self.hierarchy.mutate(|structure| {
            if structure.reps(school_id, track_id, year)?.contains(user) {
                return Ok(false);
            }
            structure.add_rep(school_id, track_id, year, user, occupancy)?;
            Ok(true)
        })?;

        let Some(contact) = self.contacts.get_contact(user)? else {
            tracing::error!(user = %user, "Contact not found while adding rep role");
            return Ok(());
        };

        if contact
            .roles
            .iter()
            .any(|r| r.is_rep_slot(school_id, track_id, year))
        {
            return Ok(());
        }

        let mut role = Role::rep(school_id, track_id, year, has_been_elected);
        role.coordinator_in_charge = self.coordinator_of(school_id)?;

        let mut roles = contact.roles;
        roles.push(role);
        self.contacts.update_contact(user, ContactUpdate::roles(roles))?;
        tracing::info!(user = %user, school_id, track_id, %year, "Added rep role");
        Ok(())
    }

    /// Seat `user` as coordinator of a school and record the role on their
    /// contact unless one for that school is already there.
    pub fn add_coordinator_role_to_user(
        &self,
        user: &UserId,
        school_id: &str,
        has_been_elected: bool,
    ) -> DirectoryResult<()> {
        self.hierarchy
            .assign_coordinator(school_id, Some(user.clone()))?;

        let Some(contact) = self.contacts.get_contact(user)? else {
            tracing::error!(user = %user, "Contact not found while adding coordinator role");
            return Ok(());
        };

        let present = contact.roles.iter().any(|r| {
            r.role_type == RoleType::Coordinator && r.school_id.as_deref() == Some(school_id)
        });
        if present {
            return Ok(());
        }

        let mut roles = contact.roles;
        roles.push(Role::coordinator(school_id, has_been_elected));
        self.contacts.update_contact(user, ContactUpdate::roles(roles))?;
        tracing::info!(user = %user, school_id, "Added coordinator role");
        Ok(())
    }

    /// Strip matching roles from the contact, then release the hierarchy slot.
    ///
    /// Contact roles are matched loosely: omitted fields match anything. The
    /// hierarchy is only touched for a fully specified rep slot, or for a
    /// coordinator removal naming a school, in which case that seat is cleared
    /// whoever holds it.
    pub fn remove_role_from_user(&self, user: &UserId, removal: &RoleRemoval) -> DirectoryResult<()> {
        let contact = self
            .contacts
            .get_contact(user)?
            .ok_or_else(|| DirectoryError::NotFound(format!("contact {user}")))?;

        let school_id = removal.school_id.as_deref();
        let track_id = removal.track_id.as_deref();

        // Unknown ids must fail before the contact is touched
        match (&removal.role_type, school_id, track_id, removal.year) {
            (RoleType::Rep, Some(school_id), Some(track_id), Some(year)) => {
                self.hierarchy.holds_rep_slot(school_id, track_id, year, user)?;
            }
            (RoleType::Coordinator, Some(school_id), _, _) => {
                self.hierarchy.coordinator_seat(school_id)?;
            }
            _ => {}
        }

        let roles: Vec<Role> = contact
            .roles
            .into_iter()
            .filter(|r| !r.matches(&removal.role_type, school_id, track_id, removal.year))
            .collect();
        self.contacts.update_contact(user, ContactUpdate::roles(roles))?;

        match (&removal.role_type, school_id, track_id, removal.year) {
            (RoleType::Rep, Some(school_id), Some(track_id), Some(year)) => {
                self.hierarchy
                    .remove_rep_from_track(school_id, track_id, year, user)?;
            }
            (RoleType::Coordinator, Some(school_id), _, _) => {
                self.hierarchy.assign_coordinator(school_id, None)?;
            }
            _ => {}
        }

        tracing::info!(user = %user, role = %removal.role_type, "Removed role");
        Ok(())
    }

    /// Openings visible to `user`: everything for the head, their own
    /// school's rep buckets for a coordinator, nothing otherwise.
    pub fn get_authorized_positions(&self, user: &UserId) -> DirectoryResult<AuthorizedPositions> {
        match self.hierarchy.get_user_role(user)? {
            Some(Position::Head) => {
                let coordinator_positions = self.hierarchy.get_available_coordinator_positions()?;
                let mut rep_positions = Vec::new();
                for seat in &coordinator_positions {
                    rep_positions.extend(self.hierarchy.get_available_rep_positions(&seat.school_id)?);
                }
                Ok(AuthorizedPositions {
                    coordinator_positions,
                    rep_positions,
                })
            }
            Some(Position::Coordinator { school_id }) => Ok(AuthorizedPositions {
                coordinator_positions: Vec::new(),
                rep_positions: self.hierarchy.get_available_rep_positions(&school_id)?,
            }),
            _ => Ok(AuthorizedPositions::default()),
        }
    }

    fn coordinator_of(&self, school_id: &str) -> DirectoryResult<Option<UserId>> {
        Ok(self
            .hierarchy
            .get_organization_structure()?
            .and_then(|s| s.school(school_id).and_then(|c| c.user_id().cloned())))
    }
}
