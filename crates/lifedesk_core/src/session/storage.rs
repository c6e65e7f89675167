//! Durable session persistence.
//!
//! # Responsibility
//! - Keep the bearer token and the user profile in local storage.
//! - Write and clear both keys together in one transaction.
//!
//! # Invariants
//! - A stored profile that no longer decodes is treated as absent.
//! - Token values never reach log lines.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::user::UserProfile;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const TOKEN_KEY: &str = "token";
const PROFILE_KEY: &str = "userProfile";

#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode session profile: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Token plus profile as written by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: String,
    pub profile: Option<UserProfile>,
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession")
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Storage backend for the session store.
pub trait SessionStorage: Send + Sync {
    /// Returns `None` when no token is stored.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;
    /// Replaces token and profile atomically.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;
    /// Removes token and profile atomically.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Key-value rows in the local client state database.
pub struct SqliteSessionStorage {
    conn: Mutex<Connection>,
}

impl SqliteSessionStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already has migrations applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for SqliteSessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let conn = self.conn();
        let Some(token) = read_value(&conn, TOKEN_KEY)? else {
            return Ok(None);
        };
        let profile = match read_value(&conn, PROFILE_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    warn!(
                        "event=session_load module=session status=degraded reason=profile_decode error={}",
                        err
                    );
                    None
                }
            },
        };
        Ok(Some(PersistedSession { token, profile }))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let profile = session
            .profile
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        write_value(&tx, TOKEN_KEY, &session.token)?;
        match profile {
            Some(raw) => write_value(&tx, PROFILE_KEY, &raw)?,
            None => delete_value(&tx, PROFILE_KEY)?,
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        delete_value(&tx, TOKEN_KEY)?;
        delete_value(&tx, PROFILE_KEY)?;
        tx.commit()?;
        Ok(())
    }
}

fn read_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM client_state WHERE key = ?1;",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

fn write_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO client_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

fn delete_value(conn: &Connection, key: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM client_state WHERE key = ?1;", params![key])?;
    Ok(())
}

/// Process-local storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistedSession, SessionStorage, SqliteSessionStorage};
    use crate::model::user::UserProfile;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            username: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
            age: None,
            gender: None,
            country: None,
            is_active: true,
        }
    }

    #[test]
    fn save_load_clear_cycle() {
        let storage = SqliteSessionStorage::in_memory().unwrap();
        assert!(storage.load().unwrap().is_none());

        let session = PersistedSession {
            token: "tok-1".to_string(),
            profile: Some(profile()),
        };
        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_profile_loads_as_absent() {
        let storage = SqliteSessionStorage::in_memory().unwrap();
        storage
            .save(&PersistedSession {
                token: "tok-2".to_string(),
                profile: Some(profile()),
            })
            .unwrap();
        storage
            .conn()
            .execute(
                "UPDATE client_state SET value = '{broken' WHERE key = 'userProfile';",
                [],
            )
            .unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok-2");
        assert_eq!(loaded.profile, None);
    }

    #[test]
    fn debug_output_hides_token() {
        let session = PersistedSession {
            token: "very-secret".to_string(),
            profile: None,
        };
        assert!(!format!("{session:?}").contains("very-secret"));
    }
}
