//! Persistence bridge over a platform key-value store.
//!
//! The core owns the keyspace and the (de)serialization of its slices; the
//! actual storage is behind [`KeyValueStore`], implemented by a platform
//! collaborator (see the SQLite crate) or by [`MemoryStore`] in tests.
//!
//! Error policy: write failures propagate as wrapped [`CoreError`]s naming
//! the operation, since silently losing a write is worse than surfacing it.
//! Read failures degrade to safe defaults with a warning, since a missing
//! preference or progress value is not fatal to app usability.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result, StoreError};
use crate::prefs::{AppSettings, CategoryPreferences};
use crate::progress::ProgressData;

/// Prefix for per-topic progress records.
pub const PROGRESS_KEY_PREFIX: &str = "audio_progress_";
/// Serialized array of completed topic ids.
pub const COMPLETED_TOPICS_KEY: &str = "completed_topics";
/// Serialized [`CategoryPreferences`].
pub const CATEGORY_PREFERENCES_KEY: &str = "category_preferences";
/// Serialized [`AppSettings`].
pub const APP_SETTINGS_KEY: &str = "app_settings";
/// Version string used for one-time migration on first run.
pub const APP_VERSION_KEY: &str = "app_version";

/// Storage key for one topic's progress record.
#[must_use]
pub fn progress_key(topic_id: &str) -> String {
    format!("{PROGRESS_KEY_PREFIX}{topic_id}")
}

/// Asynchronous key-value storage contract.
///
/// All values are strings; the bridge layers JSON on top. Every call may
/// fail; implementations map backend failures into
/// [`StoreError::Backend`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError>;
    async fn remove(&self, key: &str) -> std::result::Result<(), StoreError>;
    async fn remove_many(&self, keys: &[String]) -> std::result::Result<(), StoreError>;
    async fn list_keys(&self) -> std::result::Result<Vec<String>, StoreError>;
}

/// In-memory [`KeyValueStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> std::result::Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn list_keys(&self) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// Aggregate numbers about what is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageStats {
    /// Parseable progress records found under the progress prefix.
    pub progress_records: usize,
    /// Of those, how many are completed.
    pub completed: usize,
    /// Of those, how many are partially listened.
    pub in_progress: usize,
    /// Total keys in the backend, app-owned or not.
    pub total_keys: usize,
}

/// The persistence bridge: keyspace conventions plus serialization for the
/// persisted slices.
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist one progress record.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::SaveProgress`] naming the topic when the
    /// backend write or the serialization fails.
    pub async fn save_progress(&self, record: &ProgressData) -> Result<()> {
        let wrap = |source| CoreError::SaveProgress {
            topic_id: record.topic_id.clone(),
            source,
        };
        let value = serde_json::to_string(record)
            .map_err(StoreError::from)
            .map_err(wrap)?;
        self.store
            .set(&progress_key(&record.topic_id), &value)
            .await
            .map_err(wrap)?;
        debug!(topic_id = %record.topic_id, "Saved progress record");
        Ok(())
    }

    /// Load one progress record. Returns `None` when the record is missing
    /// or the read/parse fails; failures are logged, not propagated.
    pub async fn load_progress(&self, topic_id: &str) -> Option<ProgressData> {
        let key = progress_key(topic_id);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(topic_id, error = %err, "Failed to read progress, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(topic_id, error = %err, "Stored progress record is invalid, ignoring");
                None
            }
        }
    }

    /// Last saved position for a topic; zero when nothing usable is stored.
    pub async fn position(&self, topic_id: &str) -> Duration {
        self.load_progress(topic_id)
            .await
            .map_or(Duration::ZERO, |record| record.position)
    }

    /// Add a topic to the persisted completed-ids array.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::MarkCompleted`] when the write fails. The
    /// read of the existing array degrades to empty on failure, so a
    /// corrupted array heals on the next write.
    pub async fn mark_completed(&self, topic_id: &str) -> Result<()> {
        let mut ids = self.completed_topics().await;
        if !ids.iter().any(|id| id == topic_id) {
            ids.push(topic_id.to_string());
        }
        let wrap = |source| CoreError::MarkCompleted {
            topic_id: topic_id.to_string(),
            source,
        };
        let value = serde_json::to_string(&ids)
            .map_err(StoreError::from)
            .map_err(wrap)?;
        self.store
            .set(COMPLETED_TOPICS_KEY, &value)
            .await
            .map_err(wrap)
    }

    /// The persisted completed-ids array; empty when missing or unreadable.
    pub async fn completed_topics(&self) -> Vec<String> {
        let raw = match self.store.get(COMPLETED_TOPICS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read completed topics, treating as empty");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "Stored completed-topics array is invalid, ignoring");
            Vec::new()
        })
    }

    /// Persist the category preferences.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::SavePreferences`] when the write fails.
    pub async fn save_preferences(&self, preferences: &CategoryPreferences) -> Result<()> {
        let value = serde_json::to_string(preferences)
            .map_err(StoreError::from)
            .map_err(CoreError::SavePreferences)?;
        self.store
            .set(CATEGORY_PREFERENCES_KEY, &value)
            .await
            .map_err(CoreError::SavePreferences)
    }

    /// Load the category preferences, falling back to defaults when missing
    /// or unreadable.
    pub async fn load_preferences(&self) -> CategoryPreferences {
        self.load_or_default(CATEGORY_PREFERENCES_KEY).await
    }

    /// Persist the app settings.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::SaveSettings`] when the write fails.
    pub async fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let value = serde_json::to_string(settings)
            .map_err(StoreError::from)
            .map_err(CoreError::SaveSettings)?;
        self.store
            .set(APP_SETTINGS_KEY, &value)
            .await
            .map_err(CoreError::SaveSettings)
    }

    /// Load the app settings, falling back to defaults when missing or
    /// unreadable.
    pub async fn load_settings(&self) -> AppSettings {
        self.load_or_default(APP_SETTINGS_KEY).await
    }

    async fn load_or_default<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(key, error = %err, "Failed to read stored value, using defaults");
                return T::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key, error = %err, "Stored value is invalid, using defaults");
            T::default()
        })
    }

    /// All parseable progress records.
    ///
    /// Individual read or parse failures are skipped so one bad entry never
    /// hides the rest; only a failed key enumeration yields an empty result.
    pub async fn all_progress(&self) -> Vec<ProgressData> {
        let keys = match self.store.list_keys().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "Failed to enumerate storage keys");
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for key in keys {
            if !key.starts_with(PROGRESS_KEY_PREFIX) {
                continue;
            }
            match self.store.get(&key).await {
                Ok(Some(raw)) => match serde_json::from_str::<ProgressData>(&raw) {
                    Ok(record) => records.push(record),
                    Err(err) => warn!(key, error = %err, "Skipping invalid progress record"),
                },
                Ok(None) => {}
                Err(err) => warn!(key, error = %err, "Skipping unreadable progress record"),
            }
        }
        records
    }

    /// Aggregate storage statistics; zeroed when key enumeration fails.
    pub async fn stats(&self) -> StorageStats {
        let total_keys = match self.store.list_keys().await {
            Ok(keys) => keys.len(),
            Err(err) => {
                warn!(error = %err, "Failed to enumerate storage keys");
                return StorageStats::default();
            }
        };

        let records = self.all_progress().await;
        let completed = records.iter().filter(|r| r.completed).count();
        let in_progress = records.iter().filter(|r| r.is_in_progress()).count();

        StorageStats {
            progress_records: records.len(),
            completed,
            in_progress,
            total_keys,
        }
    }

    /// Remove every app-owned key.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::ClearStorage`] when enumeration or removal
    /// fails; clearing is a write-path operation.
    pub async fn clear_all(&self) -> Result<()> {
        let keys = self
            .store
            .list_keys()
            .await
            .map_err(CoreError::ClearStorage)?;
        let owned: Vec<String> = keys
            .into_iter()
            .filter(|key| {
                key.starts_with(PROGRESS_KEY_PREFIX)
                    || key == COMPLETED_TOPICS_KEY
                    || key == CATEGORY_PREFERENCES_KEY
                    || key == APP_SETTINGS_KEY
                    || key == APP_VERSION_KEY
            })
            .collect();
        if owned.is_empty() {
            return Ok(());
        }
        info!(keys = owned.len(), "Clearing stored app data");
        self.store
            .remove_many(&owned)
            .await
            .map_err(CoreError::ClearStorage)
    }

    /// Stamp the app version, running one-time migrations when the stored
    /// version is absent or different. Returns whether a stamp was written.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::RecordVersion`] when the stamp cannot be
    /// written. A failed read of the previous version is treated as a first
    /// run.
    pub async fn migrate(&self, current_version: &str) -> Result<bool> {
        let stored = match self.store.get(APP_VERSION_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Failed to read stored app version, treating as first run");
                None
            }
        };
        match stored {
            Some(version) if version == current_version => Ok(false),
            Some(version) => {
                info!(from = %version, to = %current_version, "Migrating stored data");
                self.store
                    .set(APP_VERSION_KEY, current_version)
                    .await
                    .map_err(CoreError::RecordVersion)?;
                Ok(true)
            }
            None => {
                info!(version = %current_version, "First run, stamping app version");
                self.store
                    .set(APP_VERSION_KEY, current_version)
                    .await
                    .map_err(CoreError::RecordVersion)?;
                Ok(true)
            }
        }
    }
}
