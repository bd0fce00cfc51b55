//! How many positions a single user may hold at once

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Occupancy rule applied when placing a user in the hierarchy.
///
/// `Permissive` allows any combination of positions. `SinglePosition`
/// restricts a user to one of: the head seat, a single coordinator seat, or
/// any number of rep slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OccupancyPolicy {
    #[default]
    Permissive,
    SinglePosition,
}

impl OccupancyPolicy {
    /// Whether a user already holding `held` may also take `target`
    pub fn allows(&self, held: &[Position], target: &Position) -> bool {
        match self {
            OccupancyPolicy::Permissive => true,
            OccupancyPolicy::SinglePosition => match target {
                Position::Rep { .. } => held.iter().all(|p| matches!(p, Position::Rep { .. })),
                _ => held.iter().all(|p| p == target),
            },
        }
    }
}

impl FromStr for OccupancyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(OccupancyPolicy::Permissive),
            "single-position" | "single_position" => Ok(OccupancyPolicy::SinglePosition),
            other => Err(format!("unknown occupancy policy: {other}")),
        }
    }
}
