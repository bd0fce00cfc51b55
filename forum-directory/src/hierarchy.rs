//! Hierarchy store operations over the organization structure singleton
//!
//! Every mutation is a read-modify-write guarded by the store's version
//! check and retried on conflict, so concurrent writers never lose updates
//! or overfill a rep bucket.

use std::sync::Arc;

use serde::Serialize;

use forum_core::{
    Catalog, Contact, CoordinatorOpening, OccupancyPolicy, OrganizationStructure, Position,
    RepOpening, UserId, Year,
};

use crate::error::DirectoryError;
use crate::store::{ContactStore, HierarchyStore};

/// Result type for directory services
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Knobs for hierarchy writes
#[derive(Debug, Clone, Copy)]
pub struct HierarchySettings {
    pub occupancy: OccupancyPolicy,
    /// Attempts per mutation before giving up on version conflicts
    pub max_write_attempts: u32,
}

impl Default for HierarchySettings {
    fn default() -> Self {
        Self {
            occupancy: OccupancyPolicy::Permissive,
            max_write_attempts: 5,
        }
    }
}

/// Reps of one year of a coordinator's track
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRoster {
    pub year: Year,
    pub reps: Vec<Contact>,
}

/// A coordinator's track with the contacts of its reps
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRoster {
    pub track_id: String,
    pub name: String,
    pub years: Vec<YearRoster>,
}

/// Everything under a coordinator's school
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorRoster {
    pub school_id: String,
    pub tracks: Vec<TrackRoster>,
}

impl CoordinatorRoster {
    pub fn reps(&self, track_id: &str, year: Year) -> Option<&[Contact]> {
        self.tracks
            .iter()
            .find(|t| t.track_id == track_id)?
            .years
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.reps.as_slice())
    }
}

/// Owns reads and writes of the organization structure
pub struct HierarchyService<H, C> {
    store: Arc<H>,
    contacts: Arc<C>,
    catalog: Arc<Catalog>,
    settings: HierarchySettings,
}

impl<H, C> Clone for HierarchyService<H, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            contacts: Arc::clone(&self.contacts),
            catalog: Arc::clone(&self.catalog),
            settings: self.settings,
        }
    }
}

impl<H, C> HierarchyService<H, C>
where
    H: HierarchyStore,
    C: ContactStore,
{
    pub fn new(
        store: Arc<H>,
        contacts: Arc<C>,
        catalog: Arc<Catalog>,
        settings: HierarchySettings,
    ) -> Self {
        Self {
            store,
            contacts,
            catalog,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> HierarchySettings {
        self.settings
    }

    /// Seed a fresh structure with `head` in charge, overwriting any existing one
    pub fn initialize_organization_structure(&self, head: &UserId) -> DirectoryResult<()> {
        let structure = OrganizationStructure::seeded(&self.catalog, head);
        let version = self.store.replace_structure(&structure)?;
        tracing::info!(head = %head, version, "Initialized organization structure");
        Ok(())
    }

    /// Seed a structure only if none exists yet. Returns whether this call
    /// created it.
    pub fn initialize_if_absent(&self, head: &UserId) -> DirectoryResult<bool> {
        if self.store.load_structure()?.is_some() {
            return Ok(false);
        }
        let structure = OrganizationStructure::seeded(&self.catalog, head);
        match self.store.swap_structure(&structure, None) {
            Ok(version) => {
                tracing::info!(head = %head, version, "Initialized organization structure");
                Ok(true)
            }
            // Someone else got there first
            Err(DirectoryError::VersionConflict) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn get_organization_structure(&self) -> DirectoryResult<Option<OrganizationStructure>> {
        Ok(self.store.load_structure()?.map(|v| v.value))
    }

    fn require_structure(&self) -> DirectoryResult<OrganizationStructure> {
        self.get_organization_structure()?
            .ok_or(DirectoryError::NotInitialized)
    }

    /// Apply `change` to the current structure and store the result,
    /// retrying from a fresh read if another writer got in between.
    ///
    /// `change` returns `Ok(false)` when there is nothing to write.
    pub(crate) fn mutate<F>(&self, mut change: F) -> DirectoryResult<OrganizationStructure>
    where
        F: FnMut(&mut OrganizationStructure) -> DirectoryResult<bool>,
    {
        let attempts = self.settings.max_write_attempts.max(1);
        for attempt in 1..=attempts {
            let current = self
                .store
                .load_structure()?
                .ok_or(DirectoryError::NotInitialized)?;

            let mut structure = current.value;
            if !change(&mut structure)? {
                return Ok(structure);
            }

            match self.store.swap_structure(&structure, Some(current.version)) {
                Ok(_) => return Ok(structure),
                Err(DirectoryError::VersionConflict) => {
                    tracing::warn!(attempt, attempts, "Organization structure changed underneath, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(DirectoryError::VersionConflict)
    }

    /// Set the coordinator of a school; `None` or an empty id clears the seat.
    /// A seated coordinator is replaced silently.
    pub fn assign_coordinator(&self, school_id: &str, user: Option<UserId>) -> DirectoryResult<()> {
        let occupancy = self.settings.occupancy;
        self.mutate(|structure| {
            structure.assign_coordinator(school_id, user.clone(), occupancy)?;
            Ok(true)
        })?;
        match user.as_ref().filter(|u| !u.as_str().is_empty()) {
            Some(user) => tracing::info!(school_id, user = %user, "Assigned coordinator"),
            None => tracing::info!(school_id, "Cleared coordinator seat"),
        }
        Ok(())
    }

    /// Append a rep to a track/year bucket, failing when it is full.
    /// Duplicates are the caller's concern.
    pub fn add_rep_to_track(
        &self,
        school_id: &str,
        track_id: &str,
        year: Year,
        rep: &UserId,
    ) -> DirectoryResult<()> {
        let occupancy = self.settings.occupancy;
        self.mutate(|structure| {
            structure.add_rep(school_id, track_id, year, rep, occupancy)?;
            Ok(true)
        })?;
        tracing::info!(school_id, track_id, %year, rep = %rep, "Added rep");
        Ok(())
    }

    /// Remove a rep from a bucket; an absent rep is a no-op
    pub fn remove_rep_from_track(
        &self,
        school_id: &str,
        track_id: &str,
        year: Year,
        rep: &UserId,
    ) -> DirectoryResult<()> {
        self.mutate(|structure| Ok(structure.remove_rep(school_id, track_id, year, rep)?))?;
        tracing::info!(school_id, track_id, %year, rep = %rep, "Removed rep");
        Ok(())
    }

    /// First position held by `user`, scanning head, then schools in order
    pub fn get_user_role(&self, user: &UserId) -> DirectoryResult<Option<Position>> {
        Ok(self
            .get_organization_structure()?
            .and_then(|s| s.first_position(user)))
    }

    /// Every position held by `user`
    pub fn get_all_positions(&self, user: &UserId) -> DirectoryResult<Vec<Position>> {
        Ok(self
            .get_organization_structure()?
            .map(|s| s.positions(user).collect())
            .unwrap_or_default())
    }

    /// Contacts of every rep under the school `user` coordinates.
    ///
    /// Reps whose contact record is missing are skipped.
    pub fn get_coordinator_reps(&self, user: &UserId) -> DirectoryResult<Option<CoordinatorRoster>> {
        let Some(structure) = self.get_organization_structure()? else {
            return Ok(None);
        };
        let Some(school) = structure.coordinated_school(user) else {
            return Ok(None);
        };

        let mut tracks = Vec::with_capacity(school.tracks().len());
        for track in school.tracks() {
            let mut years = Vec::with_capacity(Year::ALL.len());
            for year in Year::ALL {
                let mut reps = Vec::new();
                for rep_id in track.reps(year) {
                    match self.contacts.get_contact(rep_id)? {
                        Some(contact) => reps.push(contact),
                        None => tracing::warn!(rep = %rep_id, "Rep has no contact record"),
                    }
                }
                years.push(YearRoster { year, reps });
            }
            tracks.push(TrackRoster {
                track_id: track.track_id().to_string(),
                name: self.catalog.track_name(school.school_id(), track.track_id()),
                years,
            });
        }

        Ok(Some(CoordinatorRoster {
            school_id: school.school_id().to_string(),
            tracks,
        }))
    }

    /// Occupancy of every school's coordinator seat; empty before initialization
    pub fn get_available_coordinator_positions(&self) -> DirectoryResult<Vec<CoordinatorOpening>> {
        Ok(self
            .get_organization_structure()?
            .map(|s| s.coordinator_openings(&self.catalog))
            .unwrap_or_default())
    }

    /// Track/year buckets of a school with room left
    pub fn get_available_rep_positions(&self, school_id: &str) -> DirectoryResult<Vec<RepOpening>> {
        Ok(self
            .get_organization_structure()?
            .map(|s| s.rep_openings(&self.catalog, school_id))
            .unwrap_or_default())
    }

    /// Current holder of a school's coordinator seat; unknown schools fail
    pub fn coordinator_seat(&self, school_id: &str) -> DirectoryResult<Option<UserId>> {
        let structure = self.require_structure()?;
        let seat = structure
            .school(school_id)
            .ok_or_else(|| forum_core::Error::UnknownSchool(school_id.to_string()))?;
        Ok(seat.user_id().cloned())
    }

    /// Whether `user` currently sits in the given rep bucket
    pub fn holds_rep_slot(
        &self,
        school_id: &str,
        track_id: &str,
        year: Year,
        user: &UserId,
    ) -> DirectoryResult<bool> {
        let structure = self.require_structure()?;
        Ok(structure.reps(school_id, track_id, year)?.contains(user))
    }
}
