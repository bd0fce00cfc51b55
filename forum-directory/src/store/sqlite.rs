//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;

use forum_core::{
    Contact, ContactFilter, ContactUpdate, NewContact, OrganizationStructure, User, UserId,
};

use super::{
    generate_contact_id, sort_by_name, ContactStore, HierarchyStore, StoreResult, UserStore,
    Versioned,
};
use crate::error::DirectoryError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Row key of the organization structure singleton
const STRUCTURE_KEY: &str = "structure";

/// SQLite-based store implementing every store trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, DirectoryError> {
        let conn = Connection::open(path).map_err(DirectoryError::internal)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DirectoryError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), DirectoryError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(DirectoryError::internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, DirectoryError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(DirectoryError::internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(DirectoryError::internal)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), DirectoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Organization structure singleton, stored as a JSON document
            CREATE TABLE IF NOT EXISTS organization (
                id TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                body TEXT NOT NULL
            );

            -- Contacts; roles are a JSON array
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT NOT NULL,
                track TEXT NOT NULL,
                year INTEGER NOT NULL,
                roles TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_contacts_name ON contacts(name);

            CREATE TABLE IF NOT EXISTS users (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                display_name TEXT,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_login_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(DirectoryError::internal)?;

        Ok(())
    }

    fn read_contact(conn: &Connection, id: &UserId) -> StoreResult<Option<Contact>> {
        conn.query_row(
            "SELECT id, name, email, phone, track, year, roles, created_at, updated_at
             FROM contacts WHERE id = ?1",
            params![id.as_str()],
            contact_from_row,
        )
        .optional()
        .map_err(DirectoryError::internal)
    }

    fn write_contact(conn: &Connection, contact: &Contact) -> StoreResult<()> {
        let roles = serde_json::to_string(&contact.roles).map_err(DirectoryError::internal)?;
        conn.execute(
            "INSERT OR REPLACE INTO contacts
             (id, name, email, phone, track, year, roles, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                contact.id.as_str(),
                contact.name,
                contact.email,
                contact.phone,
                contact.track,
                contact.year,
                roles,
                contact.created_at.to_rfc3339(),
                contact.updated_at.to_rfc3339(),
            ],
        )
        .map_err(DirectoryError::internal)?;
        Ok(())
    }
}

fn parse_time(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json<T: DeserializeOwned>(idx: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let roles: String = row.get(6)?;
    Ok(Contact {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        track: row.get(4)?,
        year: row.get(5)?,
        roles: parse_json(6, &roles)?,
        created_at: parse_time(7, row.get(7)?)?,
        updated_at: parse_time(8, row.get(8)?)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        uid: UserId(row.get(0)?),
        email: row.get(1)?,
        display_name: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: parse_time(4, row.get(4)?)?,
        last_login_at: parse_time(5, row.get(5)?)?,
    })
}

impl HierarchyStore for SqliteStore {
    fn load_structure(&self) -> StoreResult<Option<Versioned<OrganizationStructure>>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT version, body FROM organization WHERE id = ?1",
            params![STRUCTURE_KEY],
            |row| {
                let version: i64 = row.get(0)?;
                let body: String = row.get(1)?;
                Ok(Versioned {
                    version: version as u64,
                    value: parse_json(1, &body)?,
                })
            },
        )
        .optional()
        .map_err(DirectoryError::internal)
    }

    fn replace_structure(&self, structure: &OrganizationStructure) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let body = serde_json::to_string(structure).map_err(DirectoryError::internal)?;

        conn.query_row(
            "INSERT INTO organization (id, version, body) VALUES (?1, 1, ?2)
             ON CONFLICT(id) DO UPDATE SET version = version + 1, body = excluded.body
             RETURNING version",
            params![STRUCTURE_KEY, body],
            |row| row.get::<_, i64>(0),
        )
        .map(|v| v as u64)
        .map_err(DirectoryError::internal)
    }

    fn swap_structure(
        &self,
        structure: &OrganizationStructure,
        expected: Option<u64>,
    ) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let body = serde_json::to_string(structure).map_err(DirectoryError::internal)?;

        let (changed, version) = match expected {
            None => {
                let changed = conn
                    .execute(
                        "INSERT OR IGNORE INTO organization (id, version, body) VALUES (?1, 1, ?2)",
                        params![STRUCTURE_KEY, body],
                    )
                    .map_err(DirectoryError::internal)?;
                (changed, 1)
            }
            Some(expected) => {
                let changed = conn
                    .execute(
                        "UPDATE organization SET version = version + 1, body = ?2
                         WHERE id = ?1 AND version = ?3",
                        params![STRUCTURE_KEY, body, expected as i64],
                    )
                    .map_err(DirectoryError::internal)?;
                (changed, expected + 1)
            }
        };

        if changed == 0 {
            return Err(DirectoryError::VersionConflict);
        }
        Ok(version)
    }
}

impl ContactStore for SqliteStore {
    fn create_contact(&self, contact: NewContact) -> StoreResult<Contact> {
        let conn = self.conn.lock().unwrap();
        let id = contact.id.clone().unwrap_or_else(generate_contact_id);

        if Self::read_contact(&conn, &id)?.is_some() {
            return Err(DirectoryError::Validation(format!(
                "contact {id} already exists"
            )));
        }

        let contact = contact.into_contact(id, Utc::now());
        Self::write_contact(&conn, &contact)?;
        Ok(contact)
    }

    fn get_contact(&self, id: &UserId) -> StoreResult<Option<Contact>> {
        let conn = self.conn.lock().unwrap();
        Self::read_contact(&conn, id)
    }

    fn update_contact(&self, id: &UserId, update: ContactUpdate) -> StoreResult<Contact> {
        let conn = self.conn.lock().unwrap();
        let mut contact = Self::read_contact(&conn, id)?
            .ok_or_else(|| DirectoryError::NotFound(format!("contact {id}")))?;
        update.apply(&mut contact, Utc::now());
        Self::write_contact(&conn, &contact)?;
        Ok(contact)
    }

    fn delete_contact(&self, id: &UserId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM contacts WHERE id = ?1", params![id.as_str()])
            .map_err(DirectoryError::internal)?;
        Ok(())
    }

    fn list_contacts(&self, filter: &ContactFilter) -> StoreResult<Vec<Contact>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, email, phone, track, year, roles, created_at, updated_at
                 FROM contacts ORDER BY name",
            )
            .map_err(DirectoryError::internal)?;

        let rows = stmt
            .query_map([], contact_from_row)
            .map_err(DirectoryError::internal)?;

        let mut contacts = Vec::new();
        for row in rows {
            let contact = row.map_err(DirectoryError::internal)?;
            if filter.matches(&contact) {
                contacts.push(contact);
            }
        }
        sort_by_name(&mut contacts);
        Ok(contacts)
    }
}

impl UserStore for SqliteStore {
    fn get_user(&self, uid: &UserId) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT uid, email, display_name, is_admin, created_at, last_login_at
             FROM users WHERE uid = ?1",
            params![uid.as_str()],
            user_from_row,
        )
        .optional()
        .map_err(DirectoryError::internal)
    }

    fn create_user(&self, user: User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO users
                 (uid, email, display_name, is_admin, created_at, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.uid.as_str(),
                    user.email,
                    user.display_name,
                    user.is_admin,
                    user.created_at.to_rfc3339(),
                    user.last_login_at.to_rfc3339(),
                ],
            )
            .map_err(DirectoryError::internal)?;

        if inserted == 0 {
            return Err(DirectoryError::Validation(format!(
                "user {} already exists",
                user.uid
            )));
        }
        Ok(())
    }

    fn touch_last_login(&self, uid: &UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE users SET last_login_at = ?2 WHERE uid = ?1",
                params![uid.as_str(), at.to_rfc3339()],
            )
            .map_err(DirectoryError::internal)?;

        if updated == 0 {
            return Err(DirectoryError::NotFound(format!("user {uid}")));
        }
        Ok(())
    }

    fn set_admin(&self, uid: &UserId, is_admin: bool) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE users SET is_admin = ?2 WHERE uid = ?1",
                params![uid.as_str(), is_admin],
            )
            .map_err(DirectoryError::internal)?;

        if updated == 0 {
            return Err(DirectoryError::NotFound(format!("user {uid}")));
        }
        Ok(())
    }
}
