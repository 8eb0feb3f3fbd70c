use serde::{Deserialize, Serialize};

/// Fallback duration when the host cannot report one
pub const DEFAULT_DURATION_SECS: f64 = 180.0;

pub const DEFAULT_VOLUME: u8 = 50;
pub const DEFAULT_RANGE: u32 = 15;

/// A track as resolved by the host. Identity is positional within the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, rename = "durationSeconds", alias = "duration")]
    pub duration_seconds: Option<f64>,
    #[serde(default, rename = "thumbnailUrl", alias = "thumbnail")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    #[default]
    #[serde(rename = "none")]
    Off,
    #[serde(rename = "one")]
    One,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueState {
    pub songs: Vec<Song>,
    /// 1-based; 0 means no current song
    pub current_index: usize,
    pub shuffle: bool,
    pub repeat_mode: RepeatMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

/// Transport state of the remote player as last known locally.
///
/// `is_playing` is derived from `status`, so it can never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub current_song: Option<Song>,
    pub progress_seconds: f64,
    pub duration_seconds: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            current_song: None,
            progress_seconds: 0.0,
            duration_seconds: DEFAULT_DURATION_SECS,
        }
    }
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Volume is applied live; range only with the next play command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioSettings {
    pub volume: u8,
    pub range: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            range: DEFAULT_RANGE,
        }
    }
}
