//! Content domain types: playable topics and their categories.
//!
//! These are loaded wholesale by a content collaborator and treated as
//! immutable once in the stores; a refresh replaces the whole collection.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Technical metadata about a topic's audio file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioMetadata {
    /// Encoded bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Container/codec name (e.g. "mp3", "aac").
    pub format: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// A single playable audio item.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTopic {
    /// Unique topic id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Longer description shown on detail views.
    pub description: String,
    /// Id of the category this topic belongs to.
    pub category_id: String,
    /// Where the audio is streamed/downloaded from.
    pub audio_url: String,
    /// Total track length.
    pub duration: Duration,
    /// Author/narrator, when known.
    pub author: Option<String>,
    /// Publication date, when known.
    pub publish_date: Option<DateTime<Utc>>,
    /// Thumbnail image URL, when known.
    pub thumbnail_url: Option<String>,
    /// Audio file metadata.
    pub metadata: AudioMetadata,
}

impl AudioTopic {
    /// Create a topic with the required fields; optional fields default to
    /// `None` and can be filled in with the `with_*` builders.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category_id: impl Into<String>,
        audio_url: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category_id: category_id.into(),
            audio_url: audio_url.into(),
            duration,
            author: None,
            publish_date: None,
            thumbnail_url: None,
            metadata: AudioMetadata::default(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_publish_date(mut self, date: DateTime<Utc>) -> Self {
        self.publish_date = Some(date);
        self
    }

    /// Set the thumbnail URL.
    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Set the audio file metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: AudioMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A browsable grouping of topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique category id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Longer description shown on the category screen.
    pub description: String,
    /// Number of topics in this category, as reported by the listing.
    pub topic_count: u32,
    /// Accent color (hex string, e.g. "#1DB954").
    pub color: String,
    /// Icon name, when the category has one.
    pub icon: Option<String>,
    /// Decorative background image URL, when the category has one.
    pub background_image_url: Option<String>,
}

impl Category {
    /// Create a category with the required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        topic_count: u32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            topic_count,
            color: color.into(),
            icon: None,
            background_image_url: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the background image URL.
    #[must_use]
    pub fn with_background_image(mut self, url: impl Into<String>) -> Self {
        self.background_image_url = Some(url.into());
        self
    }
}
