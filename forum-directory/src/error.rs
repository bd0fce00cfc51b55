//! Directory service error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Organization structure not initialized")]
    NotInitialized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not permitted")]
    Forbidden,

    #[error("Organization structure was modified concurrently")]
    VersionConflict,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Hierarchy(#[from] forum_core::Error),
}

impl DirectoryError {
    pub(crate) fn internal(e: impl std::fmt::Display) -> Self {
        DirectoryError::Internal(e.to_string())
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DirectoryError::NotInitialized => (
                StatusCode::CONFLICT,
                "Organization structure not initialized".to_string(),
            ),
            DirectoryError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {what}")),
            DirectoryError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            DirectoryError::Forbidden => (StatusCode::FORBIDDEN, "Not permitted".to_string()),
            DirectoryError::VersionConflict => {
                tracing::warn!("Gave up on organization update after repeated conflicts");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Organization is busy, try again".to_string(),
                )
            }
            DirectoryError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            DirectoryError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            DirectoryError::Hierarchy(e @ forum_core::Error::CapacityExceeded { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            DirectoryError::Hierarchy(e @ forum_core::Error::AlreadyPlaced { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            DirectoryError::Hierarchy(e) if e.is_validation() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            DirectoryError::Hierarchy(e) => {
                tracing::error!("Hierarchy error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
