//! Catalog endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use forum_core::School;

use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// GET /api/catalog
pub async fn get_catalog<H, C, U>(State(state): State<Arc<AppState<H, C, U>>>) -> Json<Vec<School>>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    Json(state.catalog().schools().to_vec())
}
