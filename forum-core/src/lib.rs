//! Academic Forum Core Library
//!
//! Models the three-tier organization of the academic forum:
//! - A single Head of Academic Forum
//! - One coordinator per school
//! - Up to two representatives per track and study year
//!
//! Everything here is pure data and logic. Persistence lives in
//! `forum-directory`.

pub mod catalog;
pub mod error;
pub mod model;
pub mod policy;
pub mod position;
pub mod structure;

pub use catalog::{track_id, Catalog, School};
pub use error::Error;
pub use model::{
    Contact, ContactFilter, ContactUpdate, NewContact, Role, RoleType, User, UserId, Year,
};
pub use policy::OccupancyPolicy;
pub use position::{DashboardSummary, DashboardType, Position};
pub use structure::{
    CoordinatorOpening, CoordinatorSlot, OrganizationStructure, RepOpening, TrackSlot,
    MAX_REPS_PER_YEAR,
};

/// Result type for forum-core operations
pub type Result<T> = std::result::Result<T, Error>;
