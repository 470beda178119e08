//! Playback state and its transition function.
//!
//! The state is mutated only through [`PlaybackState::apply`], a closed set
//! of transitions with no I/O and no failure path; playback errors are
//! represented in the `error` field, never thrown.

use std::time::Duration;

use crate::topic::AudioTopic;

/// Policy governing track-advance wraparound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at the playlist boundary.
    #[default]
    Off,
    /// Never advance past the current track.
    One,
    /// Wrap around at either boundary.
    All,
}

/// Current playback state.
///
/// `current_topic` is a value copy of a playlist entry, not a back-reference:
/// replacing the playlist does not retroactively change it. `current_index`
/// is `Some` only while it points inside the playlist, and whenever it is
/// `Some(i)` the current topic equals `playlist[i]` as of the transition that
/// set it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_topic: Option<AudioTopic>,
    pub position: Duration,
    pub duration: Duration,
    /// Output volume, always within `[0, 1]`.
    pub volume: f32,
    pub playback_rate: f32,
    pub is_loading: bool,
    pub error: Option<String>,
    pub playlist: Vec<AudioTopic>,
    pub current_index: Option<usize>,
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_topic: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
            playback_rate: 1.0,
            is_loading: false,
            error: None,
            playlist: Vec::new(),
            current_index: None,
            repeat: RepeatMode::Off,
            shuffle: false,
        }
    }
}

/// Playback transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackAction {
    /// Replace the current topic and clear any playback error.
    SetCurrentTopic(Option<AudioTopic>),
    SetPlaying(bool),
    SetPosition(Duration),
    SetDuration(Duration),
    /// Clamped into `[0, 1]` on write.
    SetVolume(f32),
    SetPlaybackRate(f32),
    SetLoading(bool),
    /// A non-`None` error also clears the loading flag.
    SetError(Option<String>),
    /// Replace the playlist. The index moves to the first entry (or clears
    /// for an empty list); the current topic is left untouched.
    SetPlaylist(Vec<AudioTopic>),
    /// Jump to an index. Out-of-range values are rejected silently, leaving
    /// the previous index/topic pair as-is.
    SetCurrentIndex(usize),
    NextTrack,
    PreviousTrack,
    SetRepeatMode(RepeatMode),
    SetShuffle(bool),
    /// Restore transient playback facts to their defaults. Volume, playback
    /// rate, repeat and shuffle are user preferences and survive the reset.
    Reset,
}

impl PlaybackState {
    /// Apply one transition.
    pub fn apply(&mut self, action: PlaybackAction) {
        match action {
            PlaybackAction::SetCurrentTopic(topic) => {
                self.current_topic = topic;
                self.error = None;
            }
            PlaybackAction::SetPlaying(playing) => self.is_playing = playing,
            PlaybackAction::SetPosition(position) => self.position = position,
            PlaybackAction::SetDuration(duration) => self.duration = duration,
            PlaybackAction::SetVolume(volume) => self.volume = volume.clamp(0.0, 1.0),
            PlaybackAction::SetPlaybackRate(rate) => self.playback_rate = rate,
            PlaybackAction::SetLoading(loading) => self.is_loading = loading,
            PlaybackAction::SetError(error) => {
                if error.is_some() {
                    self.is_loading = false;
                }
                self.error = error;
            }
            PlaybackAction::SetPlaylist(playlist) => {
                self.current_index = if playlist.is_empty() { None } else { Some(0) };
                self.playlist = playlist;
            }
            PlaybackAction::SetCurrentIndex(index) => {
                if let Some(topic) = self.playlist.get(index) {
                    self.current_topic = Some(topic.clone());
                    self.current_index = Some(index);
                }
            }
            PlaybackAction::NextTrack => self.step(1),
            PlaybackAction::PreviousTrack => self.step(-1),
            PlaybackAction::SetRepeatMode(mode) => self.repeat = mode,
            PlaybackAction::SetShuffle(shuffle) => self.shuffle = shuffle,
            PlaybackAction::Reset => {
                *self = Self {
                    volume: self.volume,
                    playback_rate: self.playback_rate,
                    repeat: self.repeat,
                    shuffle: self.shuffle,
                    ..Self::default()
                };
            }
        }
    }

    /// Advance the playlist cursor by one step in either direction.
    ///
    /// An unset index behaves as position -1, so the first `NextTrack` on a
    /// fresh playlist lands on index 0. The position resets only when the
    /// cursor actually moves.
    fn step(&mut self, direction: i64) {
        if self.playlist.is_empty() {
            return;
        }
        let len = i64::try_from(self.playlist.len()).unwrap_or(i64::MAX);
        let current = self
            .current_index
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1);

        let target = match self.repeat {
            RepeatMode::One => current,
            RepeatMode::All => {
                let raw = current + direction;
                if raw >= len {
                    0
                } else if raw < 0 {
                    len - 1
                } else {
                    raw
                }
            }
            RepeatMode::Off => {
                let raw = current + direction;
                if raw >= len {
                    current
                } else if raw < 0 {
                    0
                } else {
                    raw
                }
            }
        };

        if target == current {
            return;
        }
        let Ok(index) = usize::try_from(target) else {
            return;
        };
        if let Some(topic) = self.playlist.get(index) {
            self.current_topic = Some(topic.clone());
            self.current_index = Some(index);
            self.position = Duration::ZERO;
        }
    }
}
