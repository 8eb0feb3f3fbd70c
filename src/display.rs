//! Display-only text handed to the presentation layer.
//!
//! Nothing here feeds back into the model: substitutions such as the
//! "YouTube Video" sentinel change what is shown, never the song itself.

use serde::Serialize;

use crate::types::{RepeatMode, Song};

pub const IDLE_TITLE: &str = "No Music Playing";
pub const IDLE_ARTIST: &str = "Select a song to begin";

pub const LOADING_TITLE: &str = "Loading...";
pub const LOADING_ARTIST: &str = "Preparing audio stream...";
pub const LOADING_STATUS: &str = "Connecting to YouTube...";

/// Title the host reports when the stream has no metadata
pub const SENTINEL_TITLE: &str = "YouTube Video";
const SENTINEL_DISPLAY_TITLE: &str = "YouTube Stream";
const SENTINEL_DISPLAY_ARTIST: &str = "Audio from YouTube";
const SENTINEL_STATUS: &str = "Ready to play";

pub const STATUS_NOW_PLAYING: &str = "Now playing";
pub const STATUS_PLAYING: &str = "Playing";
pub const STATUS_PAUSED: &str = "Paused";
pub const STATUS_LOADING: &str = "Loading...";

const QUEUE_TITLE_WIDTH: usize = 25;
const QUEUE_ARTIST_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlayingDisplay {
    pub title: String,
    pub artist: String,
    pub status_line: String,
}

impl Default for NowPlayingDisplay {
    fn default() -> Self {
        Self::idle()
    }
}

impl NowPlayingDisplay {
    pub fn idle() -> Self {
        Self {
            title: IDLE_TITLE.to_string(),
            artist: IDLE_ARTIST.to_string(),
            status_line: String::new(),
        }
    }

    pub fn loading() -> Self {
        Self {
            title: LOADING_TITLE.to_string(),
            artist: LOADING_ARTIST.to_string(),
            status_line: LOADING_STATUS.to_string(),
        }
    }

    pub fn for_song(song: &Song) -> Self {
        if song.title == SENTINEL_TITLE {
            Self {
                title: SENTINEL_DISPLAY_TITLE.to_string(),
                artist: SENTINEL_DISPLAY_ARTIST.to_string(),
                status_line: SENTINEL_STATUS.to_string(),
            }
        } else {
            Self {
                title: song.title.clone(),
                artist: song.artist.clone(),
                status_line: STATUS_NOW_PLAYING.to_string(),
            }
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status_line = status.to_string();
    }
}

/// `m:ss`, truncating fractional seconds
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Cut to `max_chars` characters, ending in "..." when shortened
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn queue_count_label(count: usize) -> String {
    if count == 1 {
        "1 song".to_string()
    } else {
        format!("{} songs", count)
    }
}

pub fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "Repeat: Off",
        RepeatMode::One => "Repeat: One",
        RepeatMode::All => "Repeat: All",
    }
}

pub fn shuffle_label(shuffle: bool) -> &'static str {
    if shuffle {
        "Shuffle: On"
    } else {
        "Shuffle: Off"
    }
}

/// One row of the queue list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItemView {
    /// 1-based, as passed to `removeFromQueue`
    pub position: usize,
    pub title: String,
    pub artist: String,
    pub current: bool,
}

pub fn queue_items(songs: &[Song], current_index: usize) -> Vec<QueueItemView> {
    songs
        .iter()
        .enumerate()
        .map(|(i, song)| QueueItemView {
            position: i + 1,
            title: truncate_text(&song.title, QUEUE_TITLE_WIDTH),
            artist: truncate_text(&song.artist, QUEUE_ARTIST_WIDTH),
            current: i + 1 == current_index,
        })
        .collect()
}
