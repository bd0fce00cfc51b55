//! The organization structure: one head, a coordinator seat per school and
//! three capped rep buckets per track.
//!
//! The tree is seeded from the catalog once. Afterwards slots are only filled
//! and emptied, never created or removed.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::model::{UserId, Year};
use crate::policy::OccupancyPolicy;
use crate::position::Position;
use crate::Result;

/// Maximum number of representatives per track and year
pub const MAX_REPS_PER_YEAR: usize = 2;

/// Rep roster of a single track, one ordered bucket per study year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSlot {
    track_id: String,
    reps: [Vec<UserId>; 3],
}

impl TrackSlot {
    fn empty(track_id: String) -> Self {
        Self {
            track_id,
            reps: Default::default(),
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn reps(&self, year: Year) -> &[UserId] {
        &self.reps[year.index()]
    }

    /// Remaining capacity of a year bucket
    pub fn available(&self, year: Year) -> usize {
        MAX_REPS_PER_YEAR.saturating_sub(self.reps(year).len())
    }
}

/// Coordinator seat of a school together with its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorSlot {
    school_id: String,
    #[serde(default)]
    user_id: Option<UserId>,
    tracks: Vec<TrackSlot>,
}

impl CoordinatorSlot {
    pub fn school_id(&self) -> &str {
        &self.school_id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn tracks(&self) -> &[TrackSlot] {
        &self.tracks
    }

    pub fn track(&self, track_id: &str) -> Option<&TrackSlot> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}

/// An entry of the coordinator-seat listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorOpening {
    pub school_id: String,
    pub school_name: String,
    pub is_occupied: bool,
}

/// A track/year bucket that can still take representatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepOpening {
    pub school_id: String,
    pub track_id: String,
    pub track_name: String,
    pub year: Year,
    pub available: usize,
}

/// Singleton document describing who holds which position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStructure {
    #[serde(default)]
    head_of_forum: Option<UserId>,
    coordinators: Vec<CoordinatorSlot>,
}

impl OrganizationStructure {
    /// Build a fresh structure with `head` in charge and every school, track
    /// and year slot from the catalog left empty.
    pub fn seeded(catalog: &Catalog, head: &UserId) -> Self {
        let coordinators = catalog
            .schools()
            .iter()
            .map(|school| CoordinatorSlot {
                school_id: school.id.clone(),
                user_id: None,
                tracks: school
                    .tracks()
                    .map(|(track_id, _)| TrackSlot::empty(track_id))
                    .collect(),
            })
            .collect();

        Self {
            head_of_forum: Some(head.clone()).filter(|h| !h.as_str().is_empty()),
            coordinators,
        }
    }

    pub fn head_of_forum(&self) -> Option<&UserId> {
        self.head_of_forum.as_ref()
    }

    pub fn coordinators(&self) -> &[CoordinatorSlot] {
        &self.coordinators
    }

    pub fn school(&self, school_id: &str) -> Option<&CoordinatorSlot> {
        self.coordinators.iter().find(|c| c.school_id == school_id)
    }

    fn school_mut(&mut self, school_id: &str) -> Result<&mut CoordinatorSlot> {
        self.coordinators
            .iter_mut()
            .find(|c| c.school_id == school_id)
            .ok_or_else(|| Error::UnknownSchool(school_id.to_string()))
    }

    fn track_mut(&mut self, school_id: &str, track_id: &str) -> Result<&mut TrackSlot> {
        self.school_mut(school_id)?
            .tracks
            .iter_mut()
            .find(|t| t.track_id == track_id)
            .ok_or_else(|| Error::UnknownTrack {
                school_id: school_id.to_string(),
                track_id: track_id.to_string(),
            })
    }

    /// Current reps of a track/year bucket
    pub fn reps(&self, school_id: &str, track_id: &str, year: Year) -> Result<&[UserId]> {
        let school = self
            .school(school_id)
            .ok_or_else(|| Error::UnknownSchool(school_id.to_string()))?;
        let track = school.track(track_id).ok_or_else(|| Error::UnknownTrack {
            school_id: school_id.to_string(),
            track_id: track_id.to_string(),
        })?;
        Ok(track.reps(year))
    }

    /// Set or clear the coordinator of a school, returning the previous holder.
    ///
    /// An existing coordinator is overwritten without complaint.
    pub fn assign_coordinator(
        &mut self,
        school_id: &str,
        user: Option<UserId>,
        policy: OccupancyPolicy,
    ) -> Result<Option<UserId>> {
        let user = user.filter(|u| !u.as_str().is_empty());
        if let Some(user) = &user {
            let target = Position::Coordinator {
                school_id: school_id.to_string(),
            };
            self.check_policy(user, &target, policy)?;
        }
        let slot = self.school_mut(school_id)?;
        Ok(std::mem::replace(&mut slot.user_id, user))
    }

    /// Append a rep to a bucket. Fails without mutating when the bucket is
    /// full. Duplicates are not checked here.
    pub fn add_rep(
        &mut self,
        school_id: &str,
        track_id: &str,
        year: Year,
        user: &UserId,
        policy: OccupancyPolicy,
    ) -> Result<()> {
        let target = Position::Rep {
            school_id: school_id.to_string(),
            track_id: track_id.to_string(),
            year,
        };
        let track = self.track_mut(school_id, track_id)?;
        if track.reps(year).len() >= MAX_REPS_PER_YEAR {
            return Err(Error::CapacityExceeded {
                school_id: school_id.to_string(),
                track_id: track_id.to_string(),
                year: year.get(),
                max: MAX_REPS_PER_YEAR,
            });
        }
        self.check_policy(user, &target, policy)?;
        self.track_mut(school_id, track_id)?.reps[year.index()].push(user.clone());
        Ok(())
    }

    /// Remove every occurrence of `user` from a bucket. Returns whether
    /// anything changed; an absent user is not an error.
    pub fn remove_rep(
        &mut self,
        school_id: &str,
        track_id: &str,
        year: Year,
        user: &UserId,
    ) -> Result<bool> {
        let bucket = &mut self.track_mut(school_id, track_id)?.reps[year.index()];
        let before = bucket.len();
        bucket.retain(|id| id != user);
        Ok(bucket.len() != before)
    }

    fn check_policy(&self, user: &UserId, target: &Position, policy: OccupancyPolicy) -> Result<()> {
        if policy == OccupancyPolicy::Permissive {
            return Ok(());
        }
        let held: Vec<Position> = self.positions(user).collect();
        if policy.allows(&held, target) {
            Ok(())
        } else {
            Err(Error::AlreadyPlaced { user: user.clone() })
        }
    }

    /// Every position held by `user`, in scan order: head first, then per
    /// school the coordinator seat followed by its tracks and years.
    pub fn positions<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = Position> + 'a {
        let head = (self.head_of_forum.as_ref() == Some(user)).then_some(Position::Head);

        let schools = self.coordinators.iter().flat_map(move |school| {
            let coordinator = (school.user_id.as_ref() == Some(user)).then(|| {
                Position::Coordinator {
                    school_id: school.school_id.clone(),
                }
            });

            let reps = school.tracks.iter().flat_map(move |track| {
                Year::ALL
                    .into_iter()
                    .filter(move |year| track.reps(*year).contains(user))
                    .map(move |year| Position::Rep {
                        school_id: school.school_id.clone(),
                        track_id: track.track_id.clone(),
                        year,
                    })
            });

            coordinator.into_iter().chain(reps)
        });

        head.into_iter().chain(schools)
    }

    /// First position found for `user` in scan order
    pub fn first_position(&self, user: &UserId) -> Option<Position> {
        self.positions(user).next()
    }

    /// The first school whose coordinator seat `user` holds
    pub fn coordinated_school(&self, user: &UserId) -> Option<&CoordinatorSlot> {
        self.coordinators
            .iter()
            .find(|c| c.user_id.as_ref() == Some(user))
    }

    /// Occupancy of every catalog school's coordinator seat
    pub fn coordinator_openings(&self, catalog: &Catalog) -> Vec<CoordinatorOpening> {
        catalog
            .schools()
            .iter()
            .map(|school| CoordinatorOpening {
                school_id: school.id.clone(),
                school_name: school.name.clone(),
                is_occupied: self
                    .school(&school.id)
                    .is_some_and(|slot| slot.user_id.is_some()),
            })
            .collect()
    }

    /// Track/year buckets of a school with room left; empty for unknown schools
    pub fn rep_openings(&self, catalog: &Catalog, school_id: &str) -> Vec<RepOpening> {
        let Some(school) = self.school(school_id) else {
            return Vec::new();
        };

        school
            .tracks
            .iter()
            .flat_map(|track| {
                Year::ALL.into_iter().filter_map(move |year| {
                    let available = track.available(year);
                    (available > 0).then(|| RepOpening {
                        school_id: school_id.to_string(),
                        track_id: track.track_id.clone(),
                        track_name: catalog.track_name(school_id, &track.track_id),
                        year,
                        available,
                    })
                })
            })
            .collect()
    }
}
