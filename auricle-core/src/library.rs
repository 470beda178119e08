//! Topic collections and per-topic progress.
//!
//! This slice is the single owner of progress records; derived views that
//! need recently-played or completion data read them from here.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::progress::ProgressData;
use crate::topic::AudioTopic;

/// Topic lists, selection and progress records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryState {
    /// Global topic list.
    pub topics: Vec<AudioTopic>,
    /// Per-category topic cache.
    pub topics_by_category: HashMap<String, Vec<AudioTopic>>,
    /// Topics of the currently selected category.
    pub current_category_topics: Vec<AudioTopic>,
    /// Currently selected category, if any.
    pub selected_category_id: Option<String>,
    /// Progress records keyed by topic id.
    pub progress: HashMap<String, ProgressData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Library transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryAction {
    /// Replace the global topic list; clears error and loading.
    SetTopics(Vec<AudioTopic>),
    /// Replace the cached list for one category; clears error and loading.
    SetCategoryTopics {
        category_id: String,
        topics: Vec<AudioTopic>,
    },
    /// Replace the current-category list; clears error and loading.
    SetCurrentCategoryTopics(Vec<AudioTopic>),
    /// Change the selection. When a cached list exists for the id, the
    /// current-category list refreshes from the cache (cache-first; no
    /// loader is involved at this layer).
    SelectCategory(Option<String>),
    /// Insert or replace a full progress record.
    UpsertProgress(ProgressData),
    /// Mark a topic completed, bumping its play count. Creates the record
    /// when none exists yet.
    MarkCompleted { topic_id: String },
    /// Update the playback position for a topic without touching its
    /// completion flag or play count. Creates the record when none exists.
    UpdatePosition { topic_id: String, position: Duration },
    SetLoading(bool),
    /// A non-`None` error also clears the loading flag.
    SetError(Option<String>),
    ClearError,
    /// Empty all topic collections and the selection. Progress records are
    /// kept; they are only removed by an explicit storage clear.
    ClearTopics,
}

impl LibraryState {
    /// Apply one transition, stamping `last_played` with the current time
    /// where the transition calls for it.
    pub fn apply(&mut self, action: LibraryAction) {
        self.apply_at(action, Utc::now());
    }

    /// Apply one transition with an injected clock. This is the pure
    /// transition function; [`LibraryState::apply`] is the wall-clock
    /// convenience wrapper.
    pub fn apply_at(&mut self, action: LibraryAction, now: DateTime<Utc>) {
        match action {
            LibraryAction::SetTopics(topics) => {
                self.topics = topics;
                self.error = None;
                self.is_loading = false;
            }
            LibraryAction::SetCategoryTopics {
                category_id,
                topics,
            } => {
                self.topics_by_category.insert(category_id, topics);
                self.error = None;
                self.is_loading = false;
            }
            LibraryAction::SetCurrentCategoryTopics(topics) => {
                self.current_category_topics = topics;
                self.error = None;
                self.is_loading = false;
            }
            LibraryAction::SelectCategory(id) => {
                if let Some(cached) = id.as_ref().and_then(|id| self.topics_by_category.get(id)) {
                    self.current_category_topics = cached.clone();
                }
                self.selected_category_id = id;
            }
            LibraryAction::UpsertProgress(record) => {
                self.progress.insert(record.topic_id.clone(), record);
            }
            LibraryAction::MarkCompleted { topic_id } => {
                if let Some(record) = self.progress.get_mut(&topic_id) {
                    record.completed = true;
                    record.last_played = now;
                    record.play_count = record.play_count.saturating_add(1);
                } else {
                    self.progress
                        .insert(topic_id.clone(), ProgressData::completed(topic_id, now));
                }
            }
            LibraryAction::UpdatePosition { topic_id, position } => {
                if let Some(record) = self.progress.get_mut(&topic_id) {
                    record.position = position;
                    record.last_played = now;
                } else {
                    self.progress.insert(
                        topic_id.clone(),
                        ProgressData::started(topic_id, position, now),
                    );
                }
            }
            LibraryAction::SetLoading(loading) => self.is_loading = loading,
            LibraryAction::SetError(error) => {
                if error.is_some() {
                    self.is_loading = false;
                }
                self.error = error;
            }
            LibraryAction::ClearError => self.error = None,
            LibraryAction::ClearTopics => {
                self.topics.clear();
                self.topics_by_category.clear();
                self.current_category_topics.clear();
                self.selected_category_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: &str, category: &str) -> AudioTopic {
        AudioTopic::new(id, id.to_uppercase(), category, "url", Duration::from_secs(120))
    }

    #[test]
    fn test_set_topics_clears_error_and_loading() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetLoading(true));
        state.apply(LibraryAction::SetError(Some("offline".to_string())));

        state.apply(LibraryAction::SetTopics(vec![topic("t1", "news")]));
        assert_eq!(state.topics.len(), 1);
        assert!(state.error.is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_set_error_clears_loading() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetLoading(true));

        state.apply(LibraryAction::SetError(Some("offline".to_string())));
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("offline"));
    }

    #[test]
    fn test_select_category_refreshes_from_cache() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetCategoryTopics {
            category_id: "news".to_string(),
            topics: vec![topic("t1", "news"), topic("t2", "news")],
        });

        state.apply(LibraryAction::SelectCategory(Some("news".to_string())));
        assert_eq!(state.selected_category_id.as_deref(), Some("news"));
        assert_eq!(state.current_category_topics.len(), 2);
    }

    #[test]
    fn test_select_category_without_cache_keeps_current_list() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetCurrentCategoryTopics(vec![topic(
            "t1", "news",
        )]));

        state.apply(LibraryAction::SelectCategory(Some("science".to_string())));
        assert_eq!(state.selected_category_id.as_deref(), Some("science"));
        assert_eq!(state.current_category_topics.len(), 1);
    }

    #[test]
    fn test_mark_completed_creates_fresh_record() {
        let mut state = LibraryState::default();
        let now = Utc::now();

        state.apply_at(
            LibraryAction::MarkCompleted {
                topic_id: "t1".to_string(),
            },
            now,
        );

        let record = &state.progress["t1"];
        assert!(record.completed);
        assert_eq!(record.play_count, 1);
        assert_eq!(record.position, Duration::ZERO);
        assert_eq!(record.last_played, now);
    }

    #[test]
    fn test_mark_completed_twice_is_monotonic_on_play_count() {
        let mut state = LibraryState::default();
        let action = LibraryAction::MarkCompleted {
            topic_id: "t1".to_string(),
        };

        state.apply(action.clone());
        state.apply(action);

        let record = &state.progress["t1"];
        assert!(record.completed);
        assert_eq!(record.play_count, 2);
    }

    #[test]
    fn test_update_position_existing_record_keeps_completion() {
        let mut state = LibraryState::default();
        let earlier = Utc::now();
        state.apply_at(
            LibraryAction::MarkCompleted {
                topic_id: "t1".to_string(),
            },
            earlier,
        );

        let later = earlier + chrono::Duration::seconds(60);
        state.apply_at(
            LibraryAction::UpdatePosition {
                topic_id: "t1".to_string(),
                position: Duration::from_secs(30),
            },
            later,
        );

        let record = &state.progress["t1"];
        assert_eq!(record.position, Duration::from_secs(30));
        assert_eq!(record.last_played, later);
        // Untouched by a position update.
        assert!(record.completed);
        assert_eq!(record.play_count, 1);
    }

    #[test]
    fn test_update_position_creates_fresh_record() {
        let mut state = LibraryState::default();

        state.apply(LibraryAction::UpdatePosition {
            topic_id: "t1".to_string(),
            position: Duration::from_secs(12),
        });

        let record = &state.progress["t1"];
        assert_eq!(record.position, Duration::from_secs(12));
        assert!(!record.completed);
        assert_eq!(record.play_count, 0);
    }

    #[test]
    fn test_upsert_progress_replaces_record() {
        let mut state = LibraryState::default();
        let now = Utc::now();
        state.apply(LibraryAction::UpsertProgress(ProgressData::started(
            "t1",
            Duration::from_secs(5),
            now,
        )));

        state.apply(LibraryAction::UpsertProgress(ProgressData::completed(
            "t1", now,
        )));

        assert!(state.progress["t1"].completed);
        assert_eq!(state.progress.len(), 1);
    }

    #[test]
    fn test_clear_topics_keeps_progress() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetTopics(vec![topic("t1", "news")]));
        state.apply(LibraryAction::SetCategoryTopics {
            category_id: "news".to_string(),
            topics: vec![topic("t1", "news")],
        });
        state.apply(LibraryAction::SelectCategory(Some("news".to_string())));
        state.apply(LibraryAction::UpdatePosition {
            topic_id: "t1".to_string(),
            position: Duration::from_secs(9),
        });

        state.apply(LibraryAction::ClearTopics);

        assert!(state.topics.is_empty());
        assert!(state.topics_by_category.is_empty());
        assert!(state.current_category_topics.is_empty());
        assert!(state.selected_category_id.is_none());
        assert_eq!(state.progress.len(), 1);
    }

    #[test]
    fn test_clear_error_only_clears_error() {
        let mut state = LibraryState::default();
        state.apply(LibraryAction::SetError(Some("offline".to_string())));
        state.apply(LibraryAction::SetLoading(true));

        state.apply(LibraryAction::ClearError);
        assert!(state.error.is_none());
        assert!(state.is_loading);
    }
}
