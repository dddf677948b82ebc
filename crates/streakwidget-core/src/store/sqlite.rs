//! SQLite-backed streak store.
//!
//! Reads the `kv` table the app writes into. A connection is opened per
//! read so every run sees the latest upstream write and no connection is
//! shared between threads.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::StreakStore;
use crate::error::StoreError;
use crate::storage::data_dir;

/// Streak store over a SQLite `kv(key, value)` table.
#[derive(Debug, Clone)]
pub struct SqliteStreakStore {
    path: PathBuf,
}

impl SqliteStreakStore {
    /// Store at `<data_dir>/streak.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Ok(Self::at(dir.join("streak.db")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a raw value, creating the database and table if needed.
    ///
    /// This is the upstream writer's side of the store; the refresh path
    /// never calls it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or written.
    pub fn write_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn open_read_only(&self) -> Result<Connection, StoreError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })
    }
}

impl StreakStore for SqliteStreakStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let conn = self.open_read_only()?;
        let value: Option<Value> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value.and_then(|v| match v {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Text(s) => Some(s),
            Value::Blob(b) => String::from_utf8(b).ok(),
        }))
    }
}
