//! Directory records: users, contacts and the roles they hold

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable identifier shared by authentication, contact records and the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Study year of a track, always 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Year(u8);

impl Year {
    pub const FIRST: Year = Year(1);
    pub const SECOND: Year = Year(2);
    pub const THIRD: Year = Year(3);
    pub const ALL: [Year; 3] = [Year::FIRST, Year::SECOND, Year::THIRD];

    pub fn new(year: u8) -> Result<Self, Error> {
        match year {
            1..=3 => Ok(Year(year)),
            other => Err(Error::InvalidYear(other)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based bucket index
    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Year {
    type Error = Error;

    fn try_from(year: u8) -> Result<Self, Self::Error> {
        Year::new(year)
    }
}

impl From<Year> for u8 {
    fn from(year: Year) -> u8 {
        year.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of role held by a contact.
///
/// The three organizational roles are closed; anything else is a
/// display-only job title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleType {
    Head,
    Coordinator,
    Rep,
    Custom(String),
}

impl RoleType {
    pub fn as_str(&self) -> &str {
        match self {
            RoleType::Head => "head_of_academic_forum",
            RoleType::Coordinator => "coordinator",
            RoleType::Rep => "rep",
            RoleType::Custom(title) => title,
        }
    }
}

impl From<String> for RoleType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "head_of_academic_forum" => RoleType::Head,
            "coordinator" => RoleType::Coordinator,
            "rep" => RoleType::Rep,
            _ => RoleType::Custom(s),
        }
    }
}

impl From<&str> for RoleType {
    fn from(s: &str) -> Self {
        RoleType::from(s.to_string())
    }
}

impl From<RoleType> for String {
    fn from(role_type: RoleType) -> String {
        match role_type {
            RoleType::Custom(title) => title,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role entry on a contact record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "type")]
    pub role_type: RoleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    /// Coordinator overseeing this rep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_in_charge: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_been_elected: Option<bool>,
}

impl Role {
    fn bare(role_type: RoleType) -> Self {
        Self {
            role_type,
            school_id: None,
            track_id: None,
            year: None,
            coordinator_in_charge: None,
            has_been_elected: None,
        }
    }

    pub fn head() -> Self {
        Self::bare(RoleType::Head)
    }

    pub fn coordinator(school_id: &str, has_been_elected: bool) -> Self {
        Self {
            school_id: Some(school_id.to_string()),
            has_been_elected: Some(has_been_elected),
            ..Self::bare(RoleType::Coordinator)
        }
    }

    pub fn rep(school_id: &str, track_id: &str, year: Year, has_been_elected: bool) -> Self {
        Self {
            school_id: Some(school_id.to_string()),
            track_id: Some(track_id.to_string()),
            year: Some(year),
            has_been_elected: Some(has_been_elected),
            ..Self::bare(RoleType::Rep)
        }
    }

    pub fn custom(title: impl Into<String>) -> Self {
        Self::bare(RoleType::Custom(title.into()))
    }

    /// Exact match on a rep slot, ignoring election status
    pub fn is_rep_slot(&self, school_id: &str, track_id: &str, year: Year) -> bool {
        self.role_type == RoleType::Rep
            && self.school_id.as_deref() == Some(school_id)
            && self.track_id.as_deref() == Some(track_id)
            && self.year == Some(year)
    }

    /// Loose match used for removal: every supplied field must match, omitted
    /// fields match anything.
    pub fn matches(
        &self,
        role_type: &RoleType,
        school_id: Option<&str>,
        track_id: Option<&str>,
        year: Option<Year>,
    ) -> bool {
        if &self.role_type != role_type {
            return false;
        }
        if school_id.is_some_and(|s| self.school_id.as_deref() != Some(s)) {
            return false;
        }
        if track_id.is_some_and(|t| self.track_id.as_deref() != Some(t)) {
            return false;
        }
        if year.is_some_and(|y| self.year != Some(y)) {
            return false;
        }
        true
    }
}

/// A directory contact ("job holder")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    /// Free-text track label as entered by the contact
    pub track: String,
    pub year: u8,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn has_role_type(&self, role_type: &RoleType) -> bool {
        self.roles.iter().any(|r| &r.role_type == role_type)
    }
}

/// Fields supplied when creating a contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    /// Account id to key the record by; a fresh id is generated when absent
    #[serde(default)]
    pub id: Option<UserId>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub track: String,
    #[serde(default = "default_year")]
    pub year: u8,
    #[serde(default)]
    pub roles: Vec<Role>,
}

fn default_year() -> u8 {
    1
}

impl NewContact {
    pub fn into_contact(self, id: UserId, now: DateTime<Utc>) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email.filter(|e| !e.is_empty()),
            phone: self.phone,
            track: self.track,
            year: self.year,
            roles: self.roles,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a contact; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub year: Option<u8>,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

impl ContactUpdate {
    pub fn roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Some(roles),
            ..Self::default()
        }
    }

    pub fn apply(self, contact: &mut Contact, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            // Empty string clears the address
            contact.email = Some(email).filter(|e| !e.is_empty());
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(track) = self.track {
            contact.track = track;
        }
        if let Some(year) = self.year {
            contact.year = year;
        }
        if let Some(roles) = self.roles {
            contact.roles = roles;
        }
        contact.updated_at = now;
    }
}

/// Directory listing filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFilter {
    #[serde(default)]
    pub role_type: Option<RoleType>,
    /// Case-insensitive substring over name, email and track label
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub year: Option<u8>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(role_type) = &self.role_type {
            if !contact.has_role_type(role_type) {
                return false;
            }
        }

        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let hit = contact.name.to_lowercase().contains(&query)
                || contact
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&query))
                || contact.track.to_lowercase().contains(&query);
            if !hit {
                return false;
            }
        }

        if self.year.is_some_and(|y| contact.year != y) {
            return false;
        }

        if self.school_id.is_some() || self.track_id.is_some() {
            let school = self.school_id.as_deref();
            let track = self.track_id.as_deref();
            let placed = contact.roles.iter().any(|r| {
                school.map_or(true, |s| r.school_id.as_deref() == Some(s))
                    && track.map_or(true, |t| r.track_id.as_deref() == Some(t))
            });
            if !placed {
                return false;
            }
        }

        true
    }
}

/// An authenticated account, created lazily on first sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Permits bootstrapping the organization; unrelated to hierarchy roles
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}
