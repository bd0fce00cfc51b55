//! Static school and track reference data
//!
//! The catalog is loaded once at startup and never mutated. Track ids are
//! not stored: they are derived from the school id and the track's position
//! in the school's list.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Derive the identifier of the `index`-th track of a school
pub fn track_id(school_id: &str, index: usize) -> String {
    format!("{school_id}-track-{index}")
}

/// A school and the ordered names of its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<String>,
}

impl School {
    /// Iterate `(track_id, track_name)` pairs in catalog order
    pub fn tracks(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, name)| (track_id(&self.id, index), name.as_str()))
    }

    fn track_index(&self, track_id: &str) -> Option<usize> {
        let index: usize = track_id
            .strip_prefix(self.id.as_str())?
            .strip_prefix("-track-")?
            .parse()
            .ok()?;
        (index < self.tracks.len()).then_some(index)
    }
}

/// The full set of schools known to the deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    schools: Vec<School>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for school in &self.schools {
            if school.id.trim().is_empty() {
                return Err(Error::InvalidCatalog("school with empty id".to_string()));
            }
            // Dots and the track separator would make derived ids ambiguous
            if school.id.contains('.') || school.id.contains("-track-") {
                return Err(Error::InvalidCatalog(format!(
                    "school id {:?} contains a reserved sequence",
                    school.id
                )));
            }
            if !seen.insert(school.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate school id {:?}",
                    school.id
                )));
            }
        }
        Ok(())
    }

    pub fn schools(&self) -> &[School] {
        &self.schools
    }

    pub fn school(&self, school_id: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.id == school_id)
    }

    /// Display name of a track, falling back to the raw id when unknown
    pub fn track_name(&self, school_id: &str, track_id: &str) -> String {
        self.school(school_id)
            .and_then(|s| s.track_index(track_id).map(|i| s.tracks[i].clone()))
            .unwrap_or_else(|| track_id.to_string())
    }
}
