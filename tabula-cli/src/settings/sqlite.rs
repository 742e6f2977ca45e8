//! SQLite customization backend with in-memory cache.

use std::path::Path;
use std::sync::Mutex;

use dashmap::DashMap;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use tabula::{BackendError, PersistenceBackend};

/// SQLite-backed key/value storage with DashMap cache.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    cache: DashMap<String, String>,
}

impl SqliteBackend {
    /// Open (or create) the settings database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let conn = Connection::open(path.as_ref()).map_err(BackendError::storage)?;
        debug!("opened settings database {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// An in-memory database; nothing outlives the backend.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::with_connection(Connection::open_in_memory().map_err(BackendError::storage)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, BackendError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(BackendError::storage)?;

        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PersistenceBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let result: Option<String> = self
            .conn()
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| row.get(0))
            .optional()
            .map_err(BackendError::storage)?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.conn()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(BackendError::storage)?;

        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
