//! Positions held in the organization and the dashboard they resolve to

use serde::{Deserialize, Serialize};

use crate::model::Year;

/// A slot occupied by a user in the organization structure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Position {
    #[serde(rename = "head_of_academic_forum")]
    Head,
    #[serde(rename = "coordinator", rename_all = "camelCase")]
    Coordinator { school_id: String },
    #[serde(rename = "rep", rename_all = "camelCase")]
    Rep {
        school_id: String,
        track_id: String,
        year: Year,
    },
}

impl Position {
    pub fn school_id(&self) -> Option<&str> {
        match self {
            Position::Head => None,
            Position::Coordinator { school_id } | Position::Rep { school_id, .. } => {
                Some(school_id)
            }
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, Position::Head)
    }

    pub fn is_coordinator(&self) -> bool {
        matches!(self, Position::Coordinator { .. })
    }
}

/// Which dashboard the UI should open for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardType {
    Head,
    Coordinator,
    Rep,
    Public,
}

/// Summary of everything a user holds, as consumed by the dashboard switcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub dashboard_type: DashboardType,
    /// Head role when held, otherwise the first role found
    pub primary_role: Option<Position>,
    pub all_roles: Vec<Position>,
    /// Head who also coordinates a school gets a dashboard switcher
    pub show_multiple_dashboards: bool,
}

impl DashboardSummary {
    pub fn from_positions(all_roles: Vec<Position>) -> Self {
        let has_head = all_roles.iter().any(Position::is_head);
        let has_coordinator = all_roles.iter().any(Position::is_coordinator);

        let dashboard_type = if all_roles.is_empty() {
            DashboardType::Public
        } else if has_head {
            DashboardType::Head
        } else if has_coordinator {
            DashboardType::Coordinator
        } else {
            DashboardType::Rep
        };

        let primary_role = all_roles
            .iter()
            .find(|p| p.is_head())
            .or_else(|| all_roles.first())
            .cloned();

        Self {
            dashboard_type,
            primary_role,
            show_multiple_dashboards: has_head && has_coordinator,
            all_roles,
        }
    }
}
