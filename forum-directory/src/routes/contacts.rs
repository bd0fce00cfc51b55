//! Contact directory endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use forum_core::{Contact, ContactFilter, ContactUpdate, NewContact, Position, UserId};

use super::session::current_user;
use super::SuccessResponse;
use crate::directory::RepPlacement;
use crate::error::DirectoryError;
use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// Directory edits are open to the head and coordinators
fn require_manager<H, C, U>(state: &AppState<H, C, U>, actor: &UserId) -> Result<Position, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    match state.hierarchy.get_user_role(actor)? {
        Some(position @ (Position::Head | Position::Coordinator { .. })) => Ok(position),
        _ => Err(DirectoryError::Forbidden),
    }
}

/// GET /api/contacts
pub async fn list_contacts<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<Contact>>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    current_user(&headers)?;
    Ok(Json(state.directory.list_contacts(&filter)?))
}

/// GET /api/contacts/:id
pub async fn get_contact<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Contact>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    current_user(&headers)?;
    Ok(Json(state.directory.get_contact(&UserId::new(id))?))
}

/// POST /api/contacts
pub async fn create_contact<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<NewContact>,
) -> Result<Json<Contact>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    require_manager(&state, &actor)?;
    Ok(Json(state.directory.create_contact(req)?))
}

#[derive(Deserialize)]
pub struct CreateRepContactRequest {
    pub contact: NewContact,
    pub placement: RepPlacement,
}

/// POST /api/contacts/reps
pub async fn create_rep_contact<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<CreateRepContactRequest>,
) -> Result<Json<Contact>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    let contact = state
        .directory
        .create_rep_contact(&actor, req.contact, &req.placement)?;
    Ok(Json(contact))
}

/// PATCH /api/contacts/:id
///
/// Anyone may edit their own record; managers may edit any.
pub async fn update_contact<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> Result<Json<Contact>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    let id = UserId::new(id);
    if actor != id {
        require_manager(&state, &actor)?;
    }
    Ok(Json(state.directory.update_contact(&id, update)?))
}

/// DELETE /api/contacts/:id
pub async fn delete_contact<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let actor = current_user(&headers)?;
    if !require_manager(&state, &actor)?.is_head() {
        return Err(DirectoryError::Forbidden);
    }
    state.directory.delete_contact(&UserId::new(id))?;
    Ok(SuccessResponse::ok())
}
