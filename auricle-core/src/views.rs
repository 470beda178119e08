//! Memoized derived views over versioned store slices.
//!
//! [`Views`] wraps the pure functions of [`crate::select`] with one
//! [`Memo`] slot per derivation, keyed by the revision(s) of the slices it
//! reads. A view recomputes only after a transition touched one of its
//! inputs; repeated reads between dispatches return the cached value.

use std::time::Duration;

use crate::categories::CategoriesState;
use crate::library::LibraryState;
use crate::playback::PlaybackState;
use crate::prefs::PreferencesState;
use crate::progress::ProgressData;
use crate::select::{self, CompletionStats, TopicProgressView};
use crate::store::{Memo, Versioned};
use crate::topic::Category;

/// Memoization slots for every derived view.
#[derive(Debug, Default)]
pub struct Views {
    playback_progress: Memo<u64, f64>,
    formatted_position: Memo<u64, String>,
    formatted_duration: Memo<u64, String>,
    formatted_remaining: Memo<u64, String>,
    has_next: Memo<u64, bool>,
    has_previous: Memo<u64, bool>,
    can_play: Memo<u64, bool>,
    sorted_categories: Memo<(u64, u64), Vec<Category>>,
    favorite_categories: Memo<(u64, u64), Vec<Category>>,
    total_topics: Memo<u64, u64>,
    completion_stats: Memo<u64, CompletionStats>,
    completed_ids: Memo<u64, Vec<String>>,
    recently_played: Memo<u64, Vec<ProgressData>>,
    topics_by_progress: Memo<u64, Vec<TopicProgressView>>,
    total_listening_time: Memo<u64, Duration>,
}

impl Views {
    /// Fresh view cache with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playback_progress(&mut self, playback: &Versioned<PlaybackState>) -> f64 {
        self.playback_progress.get(playback.revision(), || {
            let s = playback.state();
            select::playback_progress(s.position, s.duration)
        })
    }

    pub fn formatted_position(&mut self, playback: &Versioned<PlaybackState>) -> String {
        self.formatted_position
            .get(playback.revision(), || select::formatted_position(playback.state()))
    }

    pub fn formatted_duration(&mut self, playback: &Versioned<PlaybackState>) -> String {
        self.formatted_duration
            .get(playback.revision(), || select::formatted_duration(playback.state()))
    }

    pub fn formatted_remaining(&mut self, playback: &Versioned<PlaybackState>) -> String {
        self.formatted_remaining.get(playback.revision(), || {
            let s = playback.state();
            select::formatted_remaining(s.position, s.duration)
        })
    }

    pub fn has_next_track(&mut self, playback: &Versioned<PlaybackState>) -> bool {
        self.has_next
            .get(playback.revision(), || select::has_next_track(playback.state()))
    }

    pub fn has_previous_track(&mut self, playback: &Versioned<PlaybackState>) -> bool {
        self.has_previous
            .get(playback.revision(), || select::has_previous_track(playback.state()))
    }

    pub fn can_play(&mut self, playback: &Versioned<PlaybackState>) -> bool {
        self.can_play
            .get(playback.revision(), || select::can_play(playback.state()))
    }

    pub fn sorted_categories(
        &mut self,
        categories: &Versioned<CategoriesState>,
        prefs: &Versioned<PreferencesState>,
    ) -> Vec<Category> {
        self.sorted_categories
            .get((categories.revision(), prefs.revision()), || {
                select::sorted_categories(
                    &categories.state().categories,
                    prefs.state().preferences.sort_order,
                    &prefs.state().preferences,
                )
            })
    }

    pub fn favorite_categories(
        &mut self,
        categories: &Versioned<CategoriesState>,
        prefs: &Versioned<PreferencesState>,
    ) -> Vec<Category> {
        self.favorite_categories
            .get((categories.revision(), prefs.revision()), || {
                select::favorite_categories(
                    &categories.state().categories,
                    &prefs.state().preferences,
                )
            })
    }

    pub fn total_topics_count(&mut self, categories: &Versioned<CategoriesState>) -> u64 {
        self.total_topics.get(categories.revision(), || {
            select::total_topics_count(&categories.state().categories)
        })
    }

    pub fn completion_stats(&mut self, library: &Versioned<LibraryState>) -> CompletionStats {
        self.completion_stats.get(library.revision(), || {
            let s = library.state();
            select::completion_stats(&s.topics, &s.progress)
        })
    }

    pub fn completed_topic_ids(&mut self, library: &Versioned<LibraryState>) -> Vec<String> {
        self.completed_ids.get(library.revision(), || {
            select::completed_topic_ids(&library.state().progress)
        })
    }

    pub fn recently_played(&mut self, library: &Versioned<LibraryState>) -> Vec<ProgressData> {
        self.recently_played.get(library.revision(), || {
            select::recently_played(&library.state().progress)
        })
    }

    /// Current-category topics merged with progress and ordered by listening
    /// progress.
    pub fn topics_by_progress(&mut self, library: &Versioned<LibraryState>) -> Vec<TopicProgressView> {
        self.topics_by_progress.get(library.revision(), || {
            let s = library.state();
            select::sort_by_progress(select::topics_with_progress(
                &s.current_category_topics,
                &s.progress,
            ))
        })
    }

    pub fn total_listening_time(&mut self, library: &Versioned<LibraryState>) -> Duration {
        self.total_listening_time.get(library.revision(), || {
            select::total_listening_time(&library.state().progress)
        })
    }
}
