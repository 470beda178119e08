//! SQLite-backed key-value store for listening progress and preferences.
//!
//! Implements [`KeyValueStore`] over a single `kv` table so the rest of the
//! system stays backend-agnostic. All database work runs on the
//! `tokio-rusqlite` connection thread; failures surface as
//! [`StoreError::Backend`] with the underlying message.

pub mod paths;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use auricle_core::{KeyValueStore, StoreError};
use chrono::Utc;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::info;

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

fn backend_err(err: impl fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// SQLite-based persistent key-value store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a store at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the store database cannot be created or opened.
    pub async fn new() -> Result<Self, StoreError> {
        let db_path = paths::store_db_path();
        Self::open(&db_path).await
    }

    /// Open a store at a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening store database at {:?}", path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(backend_err)?;
        }

        let conn = Connection::open(path).await.map_err(backend_err)?;
        Self::init(conn).await
    }

    /// Open an in-memory store, mainly for tests
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await.map_err(backend_err)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            Ok(())
        })
        .await
        .map_err(backend_err)?;

        info!("Store database initialized");
        Ok(Self { conn })
    }

    /// Checkpoint WAL for clean shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the WAL checkpoint fails.
    pub async fn checkpoint(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;
                Ok(())
            })
            .await
            .map_err(backend_err)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
                let value = stmt
                    .query_row(rusqlite::params![key], |row| row.get::<_, String>(0))
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(backend_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        let now = Utc::now().timestamp();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(
                    r"
                    INSERT INTO kv (key, value, updated_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at
                ",
                )?;
                stmt.execute(rusqlite::params![key, value, now])?;
                Ok(())
            })
            .await
            .map_err(backend_err)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                Ok(())
            })
            .await
            .map_err(backend_err)
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), StoreError> {
        let keys = keys.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached("DELETE FROM kv WHERE key = ?1")?;
                    for key in &keys {
                        stmt.execute(rusqlite::params![key])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(backend_err)
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare_cached("SELECT key FROM kv ORDER BY key")?;
                let keys = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(backend_err)
    }
}
