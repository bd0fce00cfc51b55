//! Error types for the forum hierarchy

use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Track {track_id} year {year} already has the maximum of {max} representatives")]
    CapacityExceeded {
        school_id: String,
        track_id: String,
        year: u8,
        max: usize,
    },

    #[error("Unknown school: {0}")]
    UnknownSchool(String),

    #[error("Unknown track {track_id} in school {school_id}")]
    UnknownTrack { school_id: String, track_id: String },

    #[error("Invalid study year {0} (expected 1-3)")]
    InvalidYear(u8),

    #[error("User {user} already holds a position in the organization")]
    AlreadyPlaced { user: UserId },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller supplied something the hierarchy does not recognize
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnknownSchool(_)
                | Error::UnknownTrack { .. }
                | Error::InvalidYear(_)
                | Error::InvalidCatalog(_)
        )
    }
}
