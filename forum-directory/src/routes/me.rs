//! Role resolution for the acting user

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use forum_core::{DashboardSummary, Position};

use super::session::current_user;
use crate::error::DirectoryError;
use crate::hierarchy::CoordinatorRoster;
use crate::roles::AuthorizedPositions;
use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// GET /api/me/role
///
/// Responds with `null` when the user holds no position.
pub async fn role<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<Option<Position>>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let user = current_user(&headers)?;
    Ok(Json(state.hierarchy.get_user_role(&user)?))
}

/// GET /api/me/roles
pub async fn roles<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Position>>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let user = current_user(&headers)?;
    Ok(Json(state.roles.get_all_user_roles(&user)?))
}

/// GET /api/me/dashboard
pub async fn dashboard<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let user = current_user(&headers)?;
    Ok(Json(state.roles.get_user_dashboard_type(&user)?))
}

/// GET /api/me/positions
pub async fn authorized_positions<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<AuthorizedPositions>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let user = current_user(&headers)?;
    Ok(Json(state.roles.get_authorized_positions(&user)?))
}

/// GET /api/me/reps
pub async fn reps<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
) -> Result<Json<CoordinatorRoster>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let user = current_user(&headers)?;
    let roster = state
        .hierarchy
        .get_coordinator_reps(&user)?
        .ok_or_else(|| DirectoryError::NotFound(format!("school coordinated by {user}")))?;
    Ok(Json(roster))
}
