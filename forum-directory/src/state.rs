//! Shared application state

use std::sync::Arc;

use forum_core::Catalog;

use crate::directory::DirectoryService;
use crate::hierarchy::{HierarchyService, HierarchySettings};
use crate::roles::RoleService;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// Application state shared across handlers
pub struct AppState<H, C, U> {
    pub hierarchy: HierarchyService<H, C>,
    pub roles: RoleService<H, C>,
    pub directory: DirectoryService<H, C, U>,
}

impl<H, C, U> AppState<H, C, U>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    pub fn new(
        catalog: Catalog,
        settings: HierarchySettings,
        admin_emails: &[String],
        hierarchy_store: Arc<H>,
        contact_store: Arc<C>,
        user_store: Arc<U>,
    ) -> Self {
        let hierarchy = HierarchyService::new(
            hierarchy_store,
            Arc::clone(&contact_store),
            Arc::new(catalog),
            settings,
        );
        let roles = RoleService::new(hierarchy.clone(), Arc::clone(&contact_store));
        let directory = DirectoryService::new(roles.clone(), contact_store, user_store, admin_emails);

        Self {
            hierarchy,
            roles,
            directory,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.hierarchy.catalog()
    }
}
