//! HTTP routes for the directory service

mod catalog;
mod contacts;
mod me;
mod organization;
mod positions;
mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

pub use session::{current_user, USER_HEADER};

/// Create the router with all routes
pub fn create_router<H, C, U>(state: Arc<AppState<H, C, U>>) -> Router
where
    H: HierarchyStore + 'static,
    C: ContactStore + 'static,
    U: UserStore + 'static,
{
    Router::new()
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/session", post(session::sign_in))
        .route("/api/organization", get(organization::get_structure))
        .route("/api/organization/initialize", post(organization::initialize))
        .route("/api/me/role", get(me::role))
        .route("/api/me/roles", get(me::roles))
        .route("/api/me/dashboard", get(me::dashboard))
        .route("/api/me/positions", get(me::authorized_positions))
        .route("/api/me/reps", get(me::reps))
        .route("/api/positions/coordinators", get(positions::coordinator_openings))
        .route("/api/positions/reps/:school_id", get(positions::rep_openings))
        .route("/api/coordinators", post(positions::assign_coordinator))
        .route("/api/reps", post(positions::add_rep))
        .route("/api/roles/remove", post(positions::remove_role))
        .route(
            "/api/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/api/contacts/reps", post(contacts::create_rep_contact))
        .route(
            "/api/contacts/:id",
            get(contacts::get_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body of successful mutations that return nothing else
#[derive(serde::Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> axum::Json<Self> {
        axum::Json(Self { success: true })
    }
}
