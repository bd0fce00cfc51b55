//! Sign-in and acting-user resolution

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use forum_core::{User, UserId};

use crate::error::DirectoryError;
use crate::state::AppState;
use crate::store::{ContactStore, HierarchyStore, UserStore};

/// Header carrying the authenticated user's uid, set by the identity proxy
pub const USER_HEADER: &str = "x-forum-user";

/// Resolve the acting user from the request headers
pub fn current_user(headers: &HeaderMap) -> Result<UserId, DirectoryError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(UserId::from)
        .ok_or(DirectoryError::NotAuthenticated)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// POST /api/session
pub async fn sign_in<H, C, U>(
    State(state): State<Arc<AppState<H, C, U>>>,
    headers: HeaderMap,
    Json(req): Json<SignInRequest>,
) -> Result<Json<User>, DirectoryError>
where
    H: HierarchyStore,
    C: ContactStore,
    U: UserStore,
{
    let uid = current_user(&headers)?;
    if req.email.trim().is_empty() {
        return Err(DirectoryError::Validation("email is required".to_string()));
    }

    let user = state
        .directory
        .record_sign_in(&uid, req.email.trim(), req.display_name)?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_current_user_reads_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static(" u1 "));
        assert_eq!(current_user(&headers).unwrap(), UserId::from("u1"));
    }

    #[test]
    fn test_current_user_missing_or_blank() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            current_user(&headers),
            Err(DirectoryError::NotAuthenticated)
        ));

        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert!(matches!(
            current_user(&headers),
            Err(DirectoryError::NotAuthenticated)
        ));
    }
}
