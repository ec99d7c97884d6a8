//! SQLite-backed key-value store
//!
//! Stores JSON documents under string keys. Each `set` is a full replace;
//! there is no locking, so concurrent writers to the same key are
//! last-write-wins.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::schema::{init_schema, needs_init};

/// Key-value store over a single SQLite table
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::from_io(e, parent.to_path_buf()))?;
            }
        }

        let conn = Connection::open(path)?;
        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get the value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(json) => decode(key, &json).map(Some),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;

        debug!("kv set {}", key);
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, json, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Remove `key`, returning whether it existed
    pub fn delete(&self, key: &str) -> StoreResult<bool> {
        debug!("kv delete {}", key);
        let removed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?", params![key])?;
        Ok(removed > 0)
    }

    /// All entries whose key starts with `prefix`, ordered by key
    pub fn get_by_prefix<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> StoreResult<Vec<(String, T)>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;

        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (key, json) = row?;
            let value = decode(&key, &json)?;
            entries.push((key, value));
        }

        debug!("kv prefix {} -> {} entries", prefix, entries.len());
        Ok(entries)
    }
}

fn decode<T: DeserializeOwned>(key: &str, json: &str) -> StoreResult<T> {
    serde_json::from_str(json).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })
}
