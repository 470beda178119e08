//! Pure derived-view functions over the store slices.
//!
//! Every function here is a total function of its inputs: no I/O, no thrown
//! errors over well-formed state. Memoized wrappers live in
//! [`crate::views`]; the functions themselves stay directly testable.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use crate::playback::{PlaybackState, RepeatMode};
use crate::prefs::{CategoryPreferences, SortOrder};
use crate::progress::ProgressData;
use crate::time::DurationExt;
use crate::topic::{AudioTopic, Category};

/// How many entries the recently-played view returns at most.
pub const RECENTLY_PLAYED_LIMIT: usize = 10;

/// Playback progress as a ratio in `[0, 1]`.
///
/// Zero while the duration is unknown; capped at 1 when the position runs
/// past the duration.
#[must_use]
pub fn playback_progress(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (position.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Current position formatted as `M:SS`.
#[must_use]
pub fn formatted_position(state: &PlaybackState) -> String {
    state.position.as_clock()
}

/// Track duration formatted as `M:SS`.
#[must_use]
pub fn formatted_duration(state: &PlaybackState) -> String {
    state.duration.as_clock()
}

/// Remaining time formatted as `-M:SS`, floored at zero.
#[must_use]
pub fn formatted_remaining(position: Duration, duration: Duration) -> String {
    format!("-{}", duration.saturating_sub(position).as_clock())
}

/// Whether advancing to a next track can do anything.
#[must_use]
pub fn has_next_track(state: &PlaybackState) -> bool {
    if state.playlist.is_empty() {
        return false;
    }
    match state.repeat {
        RepeatMode::One | RepeatMode::All => true,
        // An unset cursor behaves as position -1, so a next track exists.
        RepeatMode::Off => match state.current_index {
            Some(i) => i + 1 < state.playlist.len(),
            None => true,
        },
    }
}

/// Whether stepping back to a previous track can do anything.
#[must_use]
pub fn has_previous_track(state: &PlaybackState) -> bool {
    if state.playlist.is_empty() {
        return false;
    }
    match state.repeat {
        RepeatMode::One | RepeatMode::All => true,
        RepeatMode::Off => state.current_index.is_some_and(|i| i > 0),
    }
}

/// Whether the player is in a state where pressing play makes sense.
#[must_use]
pub fn can_play(state: &PlaybackState) -> bool {
    state.current_topic.is_some() && !state.is_loading && state.error.is_none()
}

/// Categories ordered per the user's sort preference.
///
/// Alphabetical compares names case-insensitively; popular orders by topic
/// count descending; recent puts recently-viewed categories first in view
/// order, the rest keeping their listed order.
#[must_use]
pub fn sorted_categories(
    categories: &[Category],
    order: SortOrder,
    preferences: &CategoryPreferences,
) -> Vec<Category> {
    let mut sorted = categories.to_vec();
    match order {
        SortOrder::Alphabetical => {
            sorted.sort_by_key(|c| c.name.to_lowercase());
        }
        SortOrder::Popular => {
            sorted.sort_by_key(|c| std::cmp::Reverse(c.topic_count));
        }
        SortOrder::Recent => {
            sorted.sort_by_key(|c| {
                preferences
                    .recently_viewed
                    .iter()
                    .position(|id| *id == c.id)
                    .map_or((1, 0), |rank| (0, rank))
            });
        }
    }
    sorted
}

/// Sum of topic counts across all categories.
#[must_use]
pub fn total_topics_count(categories: &[Category]) -> u64 {
    categories.iter().map(|c| u64::from(c.topic_count)).sum()
}

/// The user's favorite categories, in insertion order, resolved against the
/// category list. Ids that no longer resolve are skipped.
#[must_use]
pub fn favorite_categories(
    categories: &[Category],
    preferences: &CategoryPreferences,
) -> Vec<Category> {
    preferences
        .favorite_categories
        .iter()
        .filter_map(|id| categories.iter().find(|c| c.id == *id))
        .cloned()
        .collect()
}

/// A topic merged with its progress record.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProgressView {
    pub topic: AudioTopic,
    pub progress: Option<ProgressData>,
    pub is_completed: bool,
    pub is_in_progress: bool,
    /// Listened share in `[0, 100]`; zero without a record or when the
    /// topic's duration is unknown.
    pub progress_percentage: f64,
}

/// Merge one topic with its progress record.
#[must_use]
pub fn topic_with_progress(topic: &AudioTopic, progress: Option<&ProgressData>) -> TopicProgressView {
    let is_completed = progress.is_some_and(|p| p.completed);
    let is_in_progress = progress.is_some_and(ProgressData::is_in_progress);
    let progress_percentage = progress.map_or(0.0, |p| {
        if topic.duration.is_zero() {
            0.0
        } else {
            (p.position.as_secs_f64() / topic.duration.as_secs_f64() * 100.0).min(100.0)
        }
    });

    TopicProgressView {
        topic: topic.clone(),
        progress: progress.cloned(),
        is_completed,
        is_in_progress,
        progress_percentage,
    }
}

/// Merge a topic list with the progress map, keeping list order.
#[must_use]
pub fn topics_with_progress(
    topics: &[AudioTopic],
    progress: &HashMap<String, ProgressData>,
) -> Vec<TopicProgressView> {
    topics
        .iter()
        .map(|topic| topic_with_progress(topic, progress.get(&topic.id)))
        .collect()
}

/// Order merged views by listening progress: completed topics last;
/// in-progress before not-started; ties broken by percentage descending.
#[must_use]
pub fn sort_by_progress(mut views: Vec<TopicProgressView>) -> Vec<TopicProgressView> {
    views.sort_by(|a, b| {
        a.is_completed
            .cmp(&b.is_completed)
            .then(b.is_in_progress.cmp(&a.is_in_progress))
            .then(
                b.progress_percentage
                    .partial_cmp(&a.progress_percentage)
                    .unwrap_or(Ordering::Equal),
            )
    });
    views
}

/// Aggregate completion statistics over a topic list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    /// `completed / total`; zero for an empty list.
    pub completion_rate: f64,
}

/// Partition topics into completed / in-progress / not-started and compute
/// the completion rate.
#[must_use]
pub fn completion_stats(
    topics: &[AudioTopic],
    progress: &HashMap<String, ProgressData>,
) -> CompletionStats {
    let total = topics.len();
    let mut completed = 0_usize;
    let mut in_progress = 0_usize;

    for topic in topics {
        match progress.get(&topic.id) {
            Some(record) if record.completed => completed += 1,
            Some(record) if record.is_in_progress() => in_progress += 1,
            _ => {}
        }
    }

    #[allow(clippy::cast_precision_loss)] // topic counts are far below 2^52
    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    };

    CompletionStats {
        total,
        completed,
        in_progress,
        not_started: total - completed - in_progress,
        completion_rate,
    }
}

/// Ids of all completed topics, ordered for stable output.
#[must_use]
pub fn completed_topic_ids(progress: &HashMap<String, ProgressData>) -> Vec<String> {
    let mut ids: Vec<String> = progress
        .values()
        .filter(|p| p.completed)
        .map(|p| p.topic_id.clone())
        .collect();
    ids.sort();
    ids
}

/// Progress records with a started position, most recently played first,
/// capped to [`RECENTLY_PLAYED_LIMIT`].
#[must_use]
pub fn recently_played(progress: &HashMap<String, ProgressData>) -> Vec<ProgressData> {
    let mut records: Vec<ProgressData> = progress
        .values()
        .filter(|p| p.position > Duration::ZERO)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.last_played.cmp(&a.last_played));
    records.truncate(RECENTLY_PLAYED_LIMIT);
    records
}

/// Total time listened across all progress records.
#[must_use]
pub fn total_listening_time(progress: &HashMap<String, ProgressData>) -> Duration {
    progress.values().map(|p| p.position).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn topic(id: &str, duration_secs: u64) -> AudioTopic {
        AudioTopic::new(id, id.to_uppercase(), "cat", "url", Duration::from_secs(duration_secs))
    }

    fn record(
        topic_id: &str,
        position_secs: u64,
        completed: bool,
        played_at_secs: i64,
    ) -> ProgressData {
        ProgressData {
            topic_id: topic_id.to_string(),
            position: Duration::from_secs(position_secs),
            completed,
            last_played: Utc.timestamp_opt(played_at_secs, 0).unwrap(),
            play_count: 1,
        }
    }

    #[test]
    fn test_playback_progress_zero_duration() {
        assert!((playback_progress(Duration::from_secs(10), Duration::ZERO) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_playback_progress_caps_at_one() {
        let ratio = playback_progress(Duration::from_secs(200), Duration::from_secs(100));
        assert!((ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_playback_progress_ratio() {
        let ratio = playback_progress(Duration::from_secs(30), Duration::from_secs(120));
        assert!((ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_formatted_remaining() {
        assert_eq!(
            formatted_remaining(Duration::from_secs(35), Duration::from_secs(100)),
            "-1:05"
        );
        // Floored at zero when the position overran.
        assert_eq!(
            formatted_remaining(Duration::from_secs(120), Duration::from_secs(100)),
            "-0:00"
        );
    }

    #[test]
    fn test_has_next_track_empty_playlist() {
        let state = PlaybackState::default();
        assert!(!has_next_track(&state));
        assert!(!has_previous_track(&state));
    }

    #[test]
    fn test_has_next_track_repeat_modes() {
        let mut state = PlaybackState::default();
        state.playlist = vec![topic("a", 60), topic("b", 60)];
        state.current_index = Some(1);

        state.repeat = RepeatMode::Off;
        assert!(!has_next_track(&state));
        state.repeat = RepeatMode::All;
        assert!(has_next_track(&state));
        state.repeat = RepeatMode::One;
        assert!(has_next_track(&state));
    }

    #[test]
    fn test_has_previous_track_at_start() {
        let mut state = PlaybackState::default();
        state.playlist = vec![topic("a", 60), topic("b", 60)];
        state.current_index = Some(0);

        assert!(!has_previous_track(&state));
        state.current_index = Some(1);
        assert!(has_previous_track(&state));
    }

    #[test]
    fn test_can_play() {
        let mut state = PlaybackState::default();
        assert!(!can_play(&state));

        state.current_topic = Some(topic("a", 60));
        assert!(can_play(&state));

        state.is_loading = true;
        assert!(!can_play(&state));

        state.is_loading = false;
        state.error = Some("stream failed".to_string());
        assert!(!can_play(&state));
    }

    #[test]
    fn test_sorted_categories_alphabetical_is_case_insensitive() {
        let categories = vec![
            Category::new("c1", "beta", 1, "#000"),
            Category::new("c2", "Alpha", 2, "#000"),
            Category::new("c3", "gamma", 3, "#000"),
        ];

        let sorted = sorted_categories(
            &categories,
            SortOrder::Alphabetical,
            &CategoryPreferences::default(),
        );
        let names: Vec<&str> = sorted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_sorted_categories_popular_descending() {
        let categories = vec![
            Category::new("c1", "A", 5, "#000"),
            Category::new("c2", "B", 3, "#000"),
            Category::new("c3", "C", 8, "#000"),
        ];

        let sorted = sorted_categories(
            &categories,
            SortOrder::Popular,
            &CategoryPreferences::default(),
        );
        let counts: Vec<u32> = sorted.iter().map(|c| c.topic_count).collect();
        assert_eq!(counts, vec![8, 5, 3]);
    }

    #[test]
    fn test_sorted_categories_recent_ranks_viewed_first() {
        let categories = vec![
            Category::new("c1", "A", 1, "#000"),
            Category::new("c2", "B", 2, "#000"),
            Category::new("c3", "C", 3, "#000"),
        ];
        let preferences = CategoryPreferences {
            recently_viewed: vec!["c3".to_string(), "c1".to_string()],
            ..CategoryPreferences::default()
        };

        let sorted = sorted_categories(&categories, SortOrder::Recent, &preferences);
        let ids: Vec<&str> = sorted.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3", "c1", "c2"]);
    }

    #[test]
    fn test_total_topics_count() {
        let categories = vec![
            Category::new("c1", "A", 5, "#000"),
            Category::new("c2", "B", 3, "#000"),
            Category::new("c3", "C", 8, "#000"),
        ];
        assert_eq!(total_topics_count(&categories), 16);
    }

    #[test]
    fn test_favorite_categories_skips_unresolved() {
        let categories = vec![
            Category::new("c1", "A", 1, "#000"),
            Category::new("c2", "B", 2, "#000"),
        ];
        let preferences = CategoryPreferences {
            favorite_categories: vec!["c2".to_string(), "gone".to_string(), "c1".to_string()],
            ..CategoryPreferences::default()
        };

        let favorites = favorite_categories(&categories, &preferences);
        let ids: Vec<&str> = favorites.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
    }

    #[test]
    fn test_topic_with_progress_merge() {
        let t = topic("t1", 200);
        let p = record("t1", 50, false, 1000);

        let view = topic_with_progress(&t, Some(&p));
        assert!(!view.is_completed);
        assert!(view.is_in_progress);
        assert!((view.progress_percentage - 25.0).abs() < f64::EPSILON);

        let bare = topic_with_progress(&t, None);
        assert!(!bare.is_completed);
        assert!(!bare.is_in_progress);
        assert!((bare.progress_percentage - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_topic_with_progress_percentage_caps_at_hundred() {
        let t = topic("t1", 100);
        let p = record("t1", 500, false, 1000);

        let view = topic_with_progress(&t, Some(&p));
        assert!((view.progress_percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sort_by_progress_ordering() {
        let topics = vec![
            topic("done", 100),
            topic("fresh", 100),
            topic("half", 100),
            topic("almost", 100),
        ];
        let mut progress = HashMap::new();
        progress.insert("done".to_string(), record("done", 100, true, 1));
        progress.insert("half".to_string(), record("half", 50, false, 2));
        progress.insert("almost".to_string(), record("almost", 90, false, 3));

        let views = sort_by_progress(topics_with_progress(&topics, &progress));
        let ids: Vec<&str> = views.iter().map(|v| v.topic.id.as_str()).collect();
        // In-progress (percentage descending), then not-started, then completed.
        assert_eq!(ids, vec!["almost", "half", "fresh", "done"]);
    }

    #[test]
    fn test_completion_stats_partition() {
        let topics = vec![topic("a", 100), topic("b", 100), topic("c", 100), topic("d", 100)];
        let mut progress = HashMap::new();
        progress.insert("a".to_string(), record("a", 100, true, 1));
        progress.insert("b".to_string(), record("b", 40, false, 2));

        let stats = completion_stats(&topics, &progress);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.not_started, 2);
        assert!((stats.completion_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_stats_empty() {
        let stats = completion_stats(&[], &HashMap::new());
        assert_eq!(stats.total, 0);
        assert!((stats.completion_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completed_topic_ids_filters() {
        let mut progress = HashMap::new();
        progress.insert("topic1".to_string(), record("topic1", 100, true, 1));
        progress.insert("topic2".to_string(), record("topic2", 50, false, 2));

        let ids = completed_topic_ids(&progress);
        assert_eq!(ids, vec!["topic1"]);
    }

    #[test]
    fn test_recently_played_sorted_and_capped() {
        let mut progress = HashMap::new();
        for i in 0..12_i64 {
            let id = format!("t{i}");
            progress.insert(id.clone(), record(&id, 10, false, i));
        }
        // A record that was never started is excluded.
        progress.insert("unstarted".to_string(), record("unstarted", 0, false, 99));

        let recent = recently_played(&progress);
        assert_eq!(recent.len(), RECENTLY_PLAYED_LIMIT);
        assert_eq!(recent[0].topic_id, "t11");
        assert_eq!(recent[9].topic_id, "t2");
    }

    #[test]
    fn test_total_listening_time() {
        let mut progress = HashMap::new();
        progress.insert("a".to_string(), record("a", 30, false, 1));
        progress.insert("b".to_string(), record("b", 45, true, 2));

        assert_eq!(total_listening_time(&progress), Duration::from_secs(75));
    }
}
