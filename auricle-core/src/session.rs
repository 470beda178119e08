//! Listening session engine.
//!
//! [`Session`] owns the four store slices behind a single lock, applies
//! transitions one at a time, and broadcasts what changed so UI layers can
//! react without polling. When a [`ProgressStore`] is attached, progress and
//! preference transitions are followed by fire-and-await persistence calls;
//! a failed save surfaces as a [`SessionEvent::Error`], never a panic, and a
//! later save simply overwrites.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::categories::{CategoriesAction, CategoriesState};
use crate::library::{LibraryAction, LibraryState};
use crate::persist::ProgressStore;
use crate::playback::{PlaybackAction, PlaybackState};
use crate::prefs::{PreferencesAction, PreferencesState};
use crate::store::Versioned;
use crate::topic::AudioTopic;

/// Events emitted by the session engine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A different topic became current.
    TrackChanged { topic: AudioTopic },
    /// Playback was paused.
    PlaybackPaused { position: Duration },
    /// Playback was resumed.
    PlaybackResumed { position: Duration },
    /// The current topic was cleared.
    PlaybackStopped,
    /// The playback position moved without any other change.
    PositionChanged { position: Duration },
    /// A topic was marked completed.
    TopicCompleted { topic_id: String },
    /// A persistence operation failed.
    Error { message: String },
}

/// Versioned snapshot of every slice; cheap to clone per slice and carries
/// the revisions [`crate::views::Views`] memoizes on.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub playback: Versioned<PlaybackState>,
    pub library: Versioned<LibraryState>,
    pub categories: Versioned<CategoriesState>,
    pub prefs: Versioned<PreferencesState>,
}

struct SessionInner {
    playback: Versioned<PlaybackState>,
    library: Versioned<LibraryState>,
    categories: Versioned<CategoriesState>,
    prefs: Versioned<PreferencesState>,
}

/// Engine owning the store slices and the dispatch queue.
pub struct Session {
    inner: RwLock<SessionInner>,
    store: Option<ProgressStore>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session with no persistence attached.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a session that persists progress and preferences through the
    /// given bridge.
    #[must_use]
    pub fn with_store(store: ProgressStore) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            inner: RwLock::new(SessionInner::default()),
            store: Some(store),
            event_tx,
        })
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Apply a playback transition, emitting events for what changed.
    pub async fn dispatch_playback(&self, action: PlaybackAction) {
        let mut inner = self.inner.write().await;
        let before = inner.playback.state();
        let old_topic_id = before.current_topic.as_ref().map(|t| t.id.clone());
        let was_playing = before.is_playing;
        let old_position = before.position;

        inner.playback.update(|s| s.apply(action));
        let after = inner.playback.state();

        match &after.current_topic {
            Some(topic) if old_topic_id.as_deref() != Some(topic.id.as_str()) => {
                let _ = self.event_tx.send(SessionEvent::TrackChanged {
                    topic: topic.clone(),
                });
            }
            None if old_topic_id.is_some() => {
                let _ = self.event_tx.send(SessionEvent::PlaybackStopped);
            }
            _ => {}
        }

        if after.is_playing != was_playing {
            let event = if after.is_playing {
                SessionEvent::PlaybackResumed {
                    position: after.position,
                }
            } else {
                SessionEvent::PlaybackPaused {
                    position: after.position,
                }
            };
            let _ = self.event_tx.send(event);
        } else if after.position != old_position {
            let _ = self.event_tx.send(SessionEvent::PositionChanged {
                position: after.position,
            });
        }
    }

    /// Apply a library transition. Progress-touching transitions are
    /// persisted afterwards when a store is attached.
    pub async fn dispatch_library(&self, action: LibraryAction) {
        let touched_topic = match &action {
            LibraryAction::MarkCompleted { topic_id }
            | LibraryAction::UpdatePosition { topic_id, .. } => Some(topic_id.clone()),
            LibraryAction::UpsertProgress(record) => Some(record.topic_id.clone()),
            _ => None,
        };
        let completed = matches!(&action, LibraryAction::MarkCompleted { .. });

        let record = {
            let mut inner = self.inner.write().await;
            inner.library.update(|s| s.apply(action));
            touched_topic
                .as_ref()
                .and_then(|id| inner.library.state().progress.get(id).cloned())
        };

        if completed {
            if let Some(topic_id) = &touched_topic {
                let _ = self.event_tx.send(SessionEvent::TopicCompleted {
                    topic_id: topic_id.clone(),
                });
            }
        }

        let Some(store) = &self.store else { return };
        if let Some(record) = record {
            if let Err(err) = store.save_progress(&record).await {
                self.report_persistence_error(&err);
            }
            if completed {
                if let Err(err) = store.mark_completed(&record.topic_id).await {
                    self.report_persistence_error(&err);
                }
            }
        }
    }

    /// Apply a categories transition.
    pub async fn dispatch_categories(&self, action: CategoriesAction) {
        let mut inner = self.inner.write().await;
        inner.categories.update(|s| s.apply(action));
    }

    /// Apply a preferences transition, persisting the slice it touched when
    /// a store is attached.
    pub async fn dispatch_prefs(&self, action: PreferencesAction) {
        let settings_changed = matches!(
            action,
            PreferencesAction::SetSettings(_)
                | PreferencesAction::SetSleepTimer(_)
                | PreferencesAction::ResetSettings
        );

        let (preferences, settings) = {
            let mut inner = self.inner.write().await;
            inner.prefs.update(|s| s.apply(action));
            let state = inner.prefs.state();
            (state.preferences.clone(), state.settings.clone())
        };

        let Some(store) = &self.store else { return };
        let result = if settings_changed {
            store.save_settings(&settings).await
        } else {
            store.save_preferences(&preferences).await
        };
        if let Err(err) = result {
            self.report_persistence_error(&err);
        }
    }

    /// Load persisted progress, preferences and settings into the slices.
    /// Does nothing without an attached store.
    pub async fn hydrate(&self) {
        let Some(store) = &self.store else { return };

        let records = store.all_progress().await;
        let preferences = store.load_preferences().await;
        let settings = store.load_settings().await;

        let mut inner = self.inner.write().await;
        inner.library.update(|s| {
            for record in records {
                s.apply(LibraryAction::UpsertProgress(record));
            }
        });
        inner.prefs.update(|s| {
            s.apply(PreferencesAction::SetPreferences(preferences));
            s.apply(PreferencesAction::SetSettings(settings));
        });
    }

    /// Clone out all slices with their revisions.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot {
            playback: inner.playback.clone(),
            library: inner.library.clone(),
            categories: inner.categories.clone(),
            prefs: inner.prefs.clone(),
        }
    }

    /// Current playback state.
    pub async fn playback(&self) -> PlaybackState {
        self.inner.read().await.playback.state().clone()
    }

    /// Current library state.
    pub async fn library(&self) -> LibraryState {
        self.inner.read().await.library.state().clone()
    }

    /// Current categories state.
    pub async fn categories(&self) -> CategoriesState {
        self.inner.read().await.categories.state().clone()
    }

    /// Current preferences state.
    pub async fn preferences(&self) -> PreferencesState {
        self.inner.read().await.prefs.state().clone()
    }

    fn report_persistence_error(&self, err: &crate::error::CoreError) {
        warn!(error = %err, "Persistence operation failed");
        let _ = self.event_tx.send(SessionEvent::Error {
            message: err.to_string(),
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(SessionInner::default()),
            store: None,
            event_tx,
        }
    }
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            playback: Versioned::new(PlaybackState::default()),
            library: Versioned::new(LibraryState::default()),
            categories: Versioned::new(CategoriesState::default()),
            prefs: Versioned::new(PreferencesState::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{KeyValueStore, MemoryStore};
    use crate::playback::RepeatMode;

    fn topic(id: &str) -> AudioTopic {
        AudioTopic::new(id, id.to_uppercase(), "cat", "url", Duration::from_secs(120))
    }

    #[tokio::test]
    async fn test_track_changed_event() {
        let session = Session::new();
        let mut events = session.subscribe();

        session
            .dispatch_playback(PlaybackAction::SetCurrentTopic(Some(topic("t1"))))
            .await;

        match events.recv().await.unwrap() {
            SessionEvent::TrackChanged { topic } => assert_eq!(topic.id, "t1"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pause_resume_events() {
        let session = Session::new();
        session
            .dispatch_playback(PlaybackAction::SetCurrentTopic(Some(topic("t1"))))
            .await;

        let mut events = session.subscribe();
        session.dispatch_playback(PlaybackAction::SetPlaying(true)).await;
        session.dispatch_playback(PlaybackAction::SetPlaying(false)).await;

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PlaybackResumed { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PlaybackPaused { .. }
        ));
    }

    #[tokio::test]
    async fn test_position_change_event() {
        let session = Session::new();
        let mut events = session.subscribe();

        session
            .dispatch_playback(PlaybackAction::SetPosition(Duration::from_secs(10)))
            .await;

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PositionChanged { position } if position == Duration::from_secs(10)
        ));
    }

    #[tokio::test]
    async fn test_topic_completed_event_and_persistence() {
        let store = Arc::new(MemoryStore::new());
        let bridge = ProgressStore::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        let session = Session::with_store(bridge.clone());
        let mut events = session.subscribe();

        session
            .dispatch_library(LibraryAction::MarkCompleted {
                topic_id: "t1".to_string(),
            })
            .await;

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::TopicCompleted { topic_id } if topic_id == "t1"
        ));

        let persisted = bridge.load_progress("t1").await.unwrap();
        assert!(persisted.completed);
        assert_eq!(bridge.completed_topics().await, vec!["t1"]);
    }

    #[tokio::test]
    async fn test_hydrate_restores_progress_and_prefs() {
        let store = Arc::new(MemoryStore::new());
        let bridge = ProgressStore::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

        {
            let writer = Session::with_store(bridge.clone());
            writer
                .dispatch_library(LibraryAction::UpdatePosition {
                    topic_id: "t1".to_string(),
                    position: Duration::from_secs(42),
                })
                .await;
            writer
                .dispatch_prefs(PreferencesAction::SetSortOrder(
                    crate::prefs::SortOrder::Popular,
                ))
                .await;
        }

        let session = Session::with_store(bridge);
        session.hydrate().await;

        let library = session.library().await;
        assert_eq!(
            library.progress["t1"].position,
            Duration::from_secs(42)
        );
        let prefs = session.preferences().await;
        assert_eq!(prefs.preferences.sort_order, crate::prefs::SortOrder::Popular);
    }

    #[tokio::test]
    async fn test_persistence_failure_emits_error_event() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl KeyValueStore for FailingStore {
            async fn get(
                &self,
                _key: &str,
            ) -> Result<Option<String>, crate::error::StoreError> {
                Ok(None)
            }

            async fn set(
                &self,
                _key: &str,
                _value: &str,
            ) -> Result<(), crate::error::StoreError> {
                Err(crate::error::StoreError::Backend("disk full".to_string()))
            }

            async fn remove(&self, _key: &str) -> Result<(), crate::error::StoreError> {
                Ok(())
            }

            async fn remove_many(
                &self,
                _keys: &[String],
            ) -> Result<(), crate::error::StoreError> {
                Ok(())
            }

            async fn list_keys(&self) -> Result<Vec<String>, crate::error::StoreError> {
                Ok(Vec::new())
            }
        }

        let session = Session::with_store(ProgressStore::new(Arc::new(FailingStore)));
        let mut events = session.subscribe();

        session
            .dispatch_library(LibraryAction::UpdatePosition {
                topic_id: "t1".to_string(),
                position: Duration::from_secs(5),
            })
            .await;

        // State still updated despite the failed save.
        assert!(session.library().await.progress.contains_key("t1"));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::Error { message } if message.contains("t1")
        ));
    }

    #[tokio::test]
    async fn test_snapshot_revisions_advance() {
        let session = Session::new();
        let before = session.snapshot().await;

        session
            .dispatch_playback(PlaybackAction::SetRepeatMode(RepeatMode::All))
            .await;
        let after = session.snapshot().await;

        assert_eq!(after.playback.revision(), before.playback.revision() + 1);
        assert_eq!(after.library.revision(), before.library.revision());
    }
}
