pub mod categories;
pub mod error;
pub mod library;
pub mod persist;
pub mod playback;
pub mod prefs;
pub mod progress;
pub mod select;
pub mod session;
pub mod store;
pub mod time;
pub mod topic;
pub mod views;

pub use categories::{CategoriesAction, CategoriesState};
pub use error::{CoreError, StoreError};
pub use library::{LibraryAction, LibraryState};
pub use persist::{
    progress_key, KeyValueStore, MemoryStore, ProgressStore, StorageStats, APP_SETTINGS_KEY,
    APP_VERSION_KEY, CATEGORY_PREFERENCES_KEY, COMPLETED_TOPICS_KEY, PROGRESS_KEY_PREFIX,
};
pub use playback::{PlaybackAction, PlaybackState, RepeatMode};
pub use prefs::{
    AppSettings, CategoryPreferences, DownloadQuality, PreferencesAction, PreferencesState,
    SortOrder, Theme, RECENTLY_VIEWED_LIMIT,
};
pub use progress::ProgressData;
pub use select::{CompletionStats, TopicProgressView, RECENTLY_PLAYED_LIMIT};
pub use session::{Session, SessionEvent, SessionSnapshot};
pub use store::{Memo, Versioned};
pub use time::DurationExt;
pub use topic::{AudioMetadata, AudioTopic, Category};
pub use views::Views;
