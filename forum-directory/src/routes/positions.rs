//! Openings and hierarchy assignments

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use forum_core::{CoordinatorOpening, Position, RepOpening, RoleType, UserId, Year};

use super::session::current_user;
use super::SuccessResponse;
use crate::error::DirectoryError;
use crate::roles::RoleRemoval;
use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// GET /api/positions/coordinators
pub async fn coordinator_openings<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
) -> Result<Json<Vec<CoordinatorOpening>>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    Ok(Json(state.hierarchy.get_available_coordinator_positions()?))
}

/// GET /api/positions/reps/:school_id
pub async fn rep_openings<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    Path(school_id): Path<String>,
) -> Result<Json<Vec<RepOpening>>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    Ok(Json(state.hierarchy.get_available_rep_positions(&school_id)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCoordinatorRequest {
    /// Omitted or empty clears the seat
    #[serde(default)]
    pub user_id: Option<String>,
    pub school_id: String,
    #[serde(default)]
    pub has_been_elected: bool,
}

/// POST /api/coordinators
pub async fn assign_coordinator<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<AssignCoordinatorRequest>,
) -> Result<Json<SuccessResponse>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    if !state.roles.can_add_coordinator(&actor)? {
        return Err(DirectoryError::Forbidden);
    }

    match req.user_id.filter(|id| !id.trim().is_empty()) {
        Some(user_id) => state.roles.add_coordinator_role_to_user(
            &UserId::new(user_id),
            &req.school_id,
            req.has_been_elected,
        )?,
        None => state.hierarchy.assign_coordinator(&req.school_id, None)?,
    }

    Ok(SuccessResponse::ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRepRequest {
    pub user_id: UserId,
    pub school_id: String,
    pub track_id: String,
    pub year: Year,
    #[serde(default)]
    pub has_been_elected: bool,
}

/// POST /api/reps
pub async fn add_rep<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<AddRepRequest>,
) -> Result<Json<SuccessResponse>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    if !state
        .roles
        .can_add_rep_to_position(&actor, &req.school_id, &req.track_id, req.year)?
    {
        return Err(DirectoryError::Forbidden);
    }

    state.roles.add_rep_role_to_user(
        &req.user_id,
        &req.school_id,
        &req.track_id,
        req.year,
        req.has_been_elected,
    )?;

    Ok(SuccessResponse::ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRoleRequest {
    pub user_id: UserId,
    #[serde(flatten)]
    pub removal: RoleRemoval,
}

/// POST /api/roles/remove
///
/// The head may remove anything; a coordinator only reps of their school.
pub async fn remove_role<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<RemoveRoleRequest>,
) -> Result<Json<SuccessResponse>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    let allowed = match state.hierarchy.get_user_role(&actor)? {
        Some(Position::Head) => true,
        Some(Position::Coordinator { school_id }) => {
            req.removal.role_type == RoleType::Rep
                && req.removal.school_id.as_deref() == Some(school_id.as_str())
        }
        _ => false,
    };
    if !allowed {
        return Err(DirectoryError::Forbidden);
    }

    state.roles.remove_role_from_user(&req.user_id, &req.removal)?;
    Ok(SuccessResponse::ok())
}
