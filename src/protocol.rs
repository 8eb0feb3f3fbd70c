//! Message types exchanged with the host.
//!
//! Outbound commands are `{name, payload}` envelopes answered by a
//! [`CommandAck`]. Inbound events are `{type, ...}` objects parsed into the
//! closed [`HostEvent`] union; unknown kinds parse as [`HostEvent::Unknown`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{RepeatMode, Song};

/// Payload shared by `playMusic` and `addToQueue`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub url: String,
    pub volume: u8,
    pub range: u32,
    /// Looping is handled by the queue's repeat mode, never per song
    #[serde(rename = "loop")]
    pub looped: bool,
    pub play_now: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlayMusic(PlayRequest),
    AddToQueue(PlayRequest),
    PauseMusic,
    ResumeMusic,
    StopMusic,
    PlayNext,
    Close,
    ClearQueue,
    ToggleShuffle,
    SetVolume { volume: u8 },
    SetRepeatMode { mode: RepeatMode },
    /// 1-based queue position
    RemoveFromQueue { index: usize },
    SeekMusic { time: f64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::PlayMusic(_) => "playMusic",
            Command::AddToQueue(_) => "addToQueue",
            Command::PauseMusic => "pauseMusic",
            Command::ResumeMusic => "resumeMusic",
            Command::StopMusic => "stopMusic",
            Command::PlayNext => "playNext",
            Command::Close => "close",
            Command::ClearQueue => "clearQueue",
            Command::ToggleShuffle => "toggleShuffle",
            Command::SetVolume { .. } => "setVolume",
            Command::SetRepeatMode { .. } => "setRepeatMode",
            Command::RemoveFromQueue { .. } => "removeFromQueue",
            Command::SeekMusic { .. } => "seekMusic",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Command::PlayMusic(request) | Command::AddToQueue(request) => json!(request),
            Command::SetVolume { volume } => json!({ "volume": volume }),
            Command::SetRepeatMode { mode } => json!({ "mode": mode }),
            Command::RemoveFromQueue { index } => json!({ "index": index }),
            Command::SeekMusic { time } => json!({ "time": time }),
            Command::PauseMusic
            | Command::ResumeMusic
            | Command::StopMusic
            | Command::PlayNext
            | Command::Close
            | Command::ClearQueue
            | Command::ToggleShuffle => json!({}),
        }
    }

    pub fn envelope(&self, id: u64) -> CommandEnvelope {
        CommandEnvelope {
            id,
            name: self.name(),
            payload: self.payload(),
        }
    }
}

/// One line on the host's stdin
#[derive(Debug, Clone, Serialize)]
pub struct CommandEnvelope {
    pub id: u64,
    pub name: &'static str,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Audio settings pushed by the host when the overlay opens
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub range: Option<f64>,
}

/// Queue snapshot as sent by the host, before index validation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueSnapshot {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default, rename = "currentIndex")]
    pub current_index: i64,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default, rename = "repeatMode", alias = "repeat_mode")]
    pub repeat_mode: RepeatMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    #[serde(rename = "open", alias = "openCarPlay")]
    Open {
        #[serde(default)]
        config: Option<HostConfig>,
        #[serde(default)]
        queue: Option<QueueSnapshot>,
    },
    #[serde(rename = "close", alias = "closeCarPlay")]
    Close,
    #[serde(rename = "queueUpdated")]
    QueueUpdated { queue: QueueSnapshot },
    #[serde(rename = "notification")]
    Notification {
        #[serde(default)]
        message: String,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(rename = "musicStarted")]
    MusicStarted {
        #[serde(rename = "songInfo")]
        song_info: Song,
    },
    #[serde(rename = "musicStopped")]
    MusicStopped,
    #[serde(rename = "musicPaused")]
    MusicPaused,
    #[serde(rename = "musicResumed")]
    MusicResumed,
    #[serde(rename = "musicLoading")]
    MusicLoading,
    #[serde(rename = "updateProgress")]
    UpdateProgress {
        #[serde(default, rename = "currentTime")]
        current_time: Option<f64>,
        #[serde(default)]
        duration: Option<f64>,
        #[serde(default, rename = "isPaused")]
        is_paused: Option<bool>,
    },
    #[serde(other)]
    Unknown,
}

impl HostEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::Open { .. } => "open",
            HostEvent::Close => "close",
            HostEvent::QueueUpdated { .. } => "queueUpdated",
            HostEvent::Notification { .. } => "notification",
            HostEvent::Error { .. } => "error",
            HostEvent::MusicStarted { .. } => "musicStarted",
            HostEvent::MusicStopped => "musicStopped",
            HostEvent::MusicPaused => "musicPaused",
            HostEvent::MusicResumed => "musicResumed",
            HostEvent::MusicLoading => "musicLoading",
            HostEvent::UpdateProgress { .. } => "updateProgress",
            HostEvent::Unknown => "unknown",
        }
    }
}
