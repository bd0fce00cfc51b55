//! Directory service configuration

use std::path::PathBuf;

use forum_core::{Catalog, OccupancyPolicy};

use crate::error::DirectoryError;
use crate::hierarchy::HierarchySettings;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database path; the in-memory store is used when unset
    pub database: Option<String>,

    /// School/track catalog file; the built-in catalog is used when unset
    pub catalog: Option<PathBuf>,

    /// Accounts signing in with these emails get the admin flag
    pub admin_emails: Vec<String>,

    /// How many positions one user may hold
    pub occupancy: OccupancyPolicy,

    /// Attempts per hierarchy write before reporting a conflict
    pub max_write_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database: None,
            catalog: None,
            admin_emails: Vec::new(),
            occupancy: OccupancyPolicy::Permissive,
            max_write_attempts: 5,
        }
    }
}

impl Config {
    /// Read `FORUM_*` variables from the process environment
    pub fn from_env() -> Result<Self, DirectoryError> {
        Self::from_vars(std::env::vars())
    }

    /// Build a config from `(name, value)` pairs, ignoring unrelated names
    pub fn from_vars<I>(vars: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();

        for (name, value) in vars {
            let value = value.trim().to_string();
            match name.as_str() {
                "FORUM_PORT" => {
                    config.port = value.parse().map_err(|_| invalid(&name, &value))?;
                }
                "FORUM_DATABASE" if !value.is_empty() => config.database = Some(value),
                "FORUM_CATALOG" if !value.is_empty() => config.catalog = Some(value.into()),
                "FORUM_ADMIN_EMAILS" => {
                    config.admin_emails = value
                        .split(',')
                        .map(str::trim)
                        .filter(|e| !e.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "FORUM_OCCUPANCY_POLICY" => {
                    config.occupancy = value.parse().map_err(DirectoryError::Validation)?;
                }
                "FORUM_MAX_WRITE_ATTEMPTS" => {
                    config.max_write_attempts = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| invalid(&name, &value))?;
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Load the configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog, DirectoryError> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }

    pub fn hierarchy_settings(&self) -> HierarchySettings {
        HierarchySettings {
            occupancy: self.occupancy,
            max_write_attempts: self.max_write_attempts,
        }
    }
}

fn invalid(name: &str, value: &str) -> DirectoryError {
    DirectoryError::Validation(format!("invalid value for {name}: {value:?}"))
}
