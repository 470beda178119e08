//! User preferences: favorites, recently-viewed categories, sort order and
//! app settings. All of this slice is persisted.

use serde::{Deserialize, Serialize};

/// How many recently-viewed category ids are kept.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Category list ordering chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Alphabetical,
    Popular,
    Recent,
}

/// UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Audio quality for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownloadQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Per-user category preferences.
///
/// Favorites keep insertion order for display. Callers are responsible for
/// not adding duplicate favorite ids; the slice stores what it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryPreferences {
    #[serde(default)]
    pub favorite_categories: Vec<String>,
    #[serde(default)]
    pub recently_viewed: Vec<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// App-wide user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub auto_play: bool,
    #[serde(default)]
    pub download_quality: DownloadQuality,
    #[serde(default = "default_true")]
    pub background_playback: bool,
    #[serde(default)]
    pub skip_silence: bool,
    /// Sleep timer in minutes; `None` disables it.
    #[serde(default)]
    pub sleep_timer_minutes: Option<u32>,
}

const fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            auto_play: true,
            download_quality: DownloadQuality::default(),
            background_playback: true,
            skip_silence: false,
            sleep_timer_minutes: None,
        }
    }
}

/// Preferences slice: category preferences plus app settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferencesState {
    pub preferences: CategoryPreferences,
    pub settings: AppSettings,
}

/// Preferences transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferencesAction {
    /// Append a favorite. Duplicate suppression is the caller's job.
    AddFavorite(String),
    RemoveFavorite(String),
    /// Record a category view: moves the id to the front of the
    /// recently-viewed list and trims it to [`RECENTLY_VIEWED_LIMIT`].
    RecordRecentlyViewed(String),
    SetSortOrder(SortOrder),
    /// Replace all app settings (used by hydration and the settings screen).
    SetSettings(AppSettings),
    SetSleepTimer(Option<u32>),
    /// Replace the whole category-preferences block (used by hydration).
    SetPreferences(CategoryPreferences),
    ResetSettings,
}

impl PreferencesState {
    /// Apply one transition.
    pub fn apply(&mut self, action: PreferencesAction) {
        match action {
            PreferencesAction::AddFavorite(id) => {
                self.preferences.favorite_categories.push(id);
            }
            PreferencesAction::RemoveFavorite(id) => {
                self.preferences.favorite_categories.retain(|f| *f != id);
            }
            PreferencesAction::RecordRecentlyViewed(id) => {
                let recents = &mut self.preferences.recently_viewed;
                recents.retain(|r| *r != id);
                recents.insert(0, id);
                recents.truncate(RECENTLY_VIEWED_LIMIT);
            }
            PreferencesAction::SetSortOrder(order) => self.preferences.sort_order = order,
            PreferencesAction::SetSettings(settings) => self.settings = settings,
            PreferencesAction::SetSleepTimer(minutes) => {
                self.settings.sleep_timer_minutes = minutes;
            }
            PreferencesAction::SetPreferences(preferences) => self.preferences = preferences,
            PreferencesAction::ResetSettings => self.settings = AppSettings::default(),
        }
    }
}
