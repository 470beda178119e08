//! Per-topic playback progress records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Persisted playback state for one topic.
///
/// One record exists per topic id. Records are created on the first position
/// update or completion event, updated in place afterwards, and only removed
/// by an explicit clear-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    /// Topic this record belongs to.
    pub topic_id: String,
    /// Last known playback position.
    #[serde(with = "crate::time::secs")]
    pub position: Duration,
    /// Whether the topic has been listened to completion.
    pub completed: bool,
    /// When the topic was last played. Persisted as RFC 3339.
    pub last_played: DateTime<Utc>,
    /// Number of explicit play/completion events for this topic.
    pub play_count: u32,
}

impl ProgressData {
    /// Fresh record for a topic that has just started playing.
    pub fn started(topic_id: impl Into<String>, position: Duration, now: DateTime<Utc>) -> Self {
        Self {
            topic_id: topic_id.into(),
            position,
            completed: false,
            last_played: now,
            play_count: 0,
        }
    }

    /// Fresh record for a topic completed without a prior position update.
    pub fn completed(topic_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            topic_id: topic_id.into(),
            position: Duration::ZERO,
            completed: true,
            last_played: now,
            play_count: 1,
        }
    }

    /// Whether this record represents a partially-listened topic.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        !self.completed && self.position > Duration::ZERO
    }
}
