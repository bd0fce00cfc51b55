//! Organization structure endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use forum_core::OrganizationStructure;

use super::session::current_user;
use crate::error::DirectoryError;
use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// GET /api/organization
pub async fn get_structure<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
) -> Result<Json<OrganizationStructure>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let structure = state
        .hierarchy
        .get_organization_structure()?
        .ok_or(DirectoryError::NotInitialized)?;
    Ok(Json(structure))
}

#[derive(Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub created: bool,
}

/// POST /api/organization/initialize
pub async fn initialize<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<InitializeResponse>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    let created = state.directory.bootstrap_organization(&actor)?;

    Ok(Json(InitializeResponse {
        success: true,
        created,
    }))
}
