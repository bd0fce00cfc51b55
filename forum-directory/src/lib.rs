//! Academic Forum Directory
//!
//! Serves the organization hierarchy, role resolution and the contact
//! directory to a client-rendered UI.

pub mod config;
pub mod directory;
pub mod error;
pub mod hierarchy;
pub mod roles;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use directory::{DirectoryService, RepPlacement};
pub use error::DirectoryError;
pub use hierarchy::{
    CoordinatorRoster, DirectoryResult, HierarchyService, HierarchySettings, TrackRoster,
    YearRoster,
};
pub use roles::{AuthorizedPositions, RoleRemoval, RoleService};
pub use routes::USER_HEADER;
pub use state::AppState;
pub use store::{
    ContactStore, HierarchyStore, InMemoryContactStore, InMemoryHierarchyStore,
    InMemoryUserStore, SqliteStore, UserStore,
};
