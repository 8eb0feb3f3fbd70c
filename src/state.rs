use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;

use crate::artwork::Artwork;
use crate::display::{self, NowPlayingDisplay, QueueItemView};
use crate::progress::ProgressClock;
use crate::toast::{Severity, ToastQueue};
use crate::types::{AudioSettings, PlaybackState, PlaybackStatus, QueueState};

/// Everything the overlay knows. Owned by one context object and mutated
/// only under the write lock; locks are never held across an await.
#[derive(Debug, Clone)]
pub struct Session {
    pub overlay_visible: bool,
    pub settings_open: bool,
    pub audio: AudioSettings,
    pub playback: PlaybackState,
    pub queue: QueueState,
    pub display: NowPlayingDisplay,
    pub artwork: Artwork,
    /// Bumped whenever a new track replaces artwork; late loads compare against it
    pub artwork_generation: u64,
    pub toasts: ToastQueue,
    pub progress_clock: ProgressClock,
}

pub type SharedState = Arc<RwLock<Session>>;

pub fn create_state(audio: AudioSettings, interpolate_progress: bool) -> SharedState {
    Arc::new(RwLock::new(Session::new(audio, interpolate_progress)))
}

impl Session {
    pub fn new(audio: AudioSettings, interpolate_progress: bool) -> Self {
        Self {
            overlay_visible: false,
            settings_open: false,
            audio,
            playback: PlaybackState::default(),
            queue: QueueState::default(),
            display: NowPlayingDisplay::idle(),
            artwork: Artwork::Placeholder,
            artwork_generation: 0,
            toasts: ToastQueue::default(),
            progress_clock: ProgressClock::new(interpolate_progress),
        }
    }

    /// Back to defaults when the overlay goes away; audio settings survive
    pub fn reset(&mut self) {
        self.settings_open = false;
        self.playback = PlaybackState::default();
        self.queue = QueueState::default();
        self.display = NowPlayingDisplay::idle();
        self.artwork = Artwork::Placeholder;
        self.artwork_generation += 1;
        self.toasts.clear();
        self.progress_clock.clear();
    }

    /// Leave the optimistic loading state after a play command failed.
    ///
    /// Works from what the session shows now rather than a saved copy, since
    /// host events and other play commands may have run in the meantime. If
    /// the host has already moved on (a track started, say) nothing changes.
    /// `previous` is the status seen when the failed command began.
    pub fn abandon_loading(&mut self, previous: PlaybackStatus) {
        let showing_loading = self.playback.status == PlaybackStatus::Loading
            || self.display == NowPlayingDisplay::loading();
        if !showing_loading {
            return;
        }

        let settled = match (&self.playback.current_song, previous) {
            (None, _) => PlaybackStatus::Idle,
            (Some(_), PlaybackStatus::Playing | PlaybackStatus::Paused) => previous,
            (Some(_), _) => PlaybackStatus::Paused,
        };
        self.playback.cancel_loading(settled);

        self.display = match &self.playback.current_song {
            None => NowPlayingDisplay::idle(),
            Some(song) => {
                let mut text = NowPlayingDisplay::for_song(song);
                if self.playback.status == PlaybackStatus::Paused {
                    text.set_status(display::STATUS_PAUSED);
                }
                text
            }
        };
    }

    /// Flatten into what the presentation layer renders
    pub fn view(&self, now: Instant) -> OverlayView {
        let progress = self.progress_clock.displayed(&self.playback, now);
        let duration = self.playback.duration_seconds;
        let progress_percent = if duration > 0.0 {
            (progress / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        OverlayView {
            visible: self.overlay_visible,
            settings_open: self.settings_open,
            title: self.display.title.clone(),
            artist: self.display.artist.clone(),
            status_line: self.display.status_line.clone(),
            is_playing: self.playback.is_playing(),
            progress_seconds: progress,
            duration_seconds: duration,
            progress_label: display::format_time(progress),
            duration_label: display::format_time(duration),
            progress_percent,
            artwork: self.artwork.clone(),
            volume: self.audio.volume,
            range: self.audio.range,
            queue_label: display::queue_count_label(self.queue.songs.len()),
            queue: display::queue_items(&self.queue.songs, self.queue.current_index),
            shuffle_label: display::shuffle_label(self.queue.shuffle),
            repeat_label: display::repeat_label(self.queue.repeat_mode),
            toasts: self
                .toasts
                .iter()
                .map(|t| ToastView {
                    message: t.message.clone(),
                    severity: t.severity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastView {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub visible: bool,
    pub settings_open: bool,
    pub title: String,
    pub artist: String,
    pub status_line: String,
    pub is_playing: bool,
    pub progress_seconds: f64,
    pub duration_seconds: f64,
    pub progress_label: String,
    pub duration_label: String,
    pub progress_percent: f64,
    pub artwork: Artwork,
    pub volume: u8,
    pub range: u32,
    pub queue_label: String,
    pub queue: Vec<QueueItemView>,
    pub shuffle_label: &'static str,
    pub repeat_label: &'static str,
    pub toasts: Vec<ToastView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Song;

    #[test]
    fn fresh_session_renders_idle_placeholders() {
        let session = Session::new(AudioSettings::default(), false);
        let view = session.view(Instant::now());
        assert!(!view.visible);
        assert_eq!(view.title, display::IDLE_TITLE);
        assert_eq!(view.artist, display::IDLE_ARTIST);
        assert_eq!(view.duration_label, "3:00");
        assert_eq!(view.queue_label, "0 songs");
        assert_eq!(view.artwork, Artwork::Placeholder);
    }

    #[test]
    fn reset_keeps_audio_settings() {
        let audio = AudioSettings {
            volume: 80,
            range: 30,
        };
        let mut session = Session::new(audio, false);
        session.overlay_visible = true;
        session.playback.start_track(Song {
            title: "x".to_string(),
            artist: "y".to_string(),
            duration_seconds: Some(90.0),
            thumbnail_url: None,
        });
        session.toasts.error("oops");

        session.reset();
        assert_eq!(session.audio, audio);
        assert_eq!(session.playback, PlaybackState::default());
        assert!(session.toasts.is_empty());
    }

    fn song(title: &str) -> Song {
        Song {
            title: title.to_string(),
            artist: "y".to_string(),
            duration_seconds: Some(90.0),
            thumbnail_url: None,
        }
    }

    #[test]
    fn abandon_loading_without_song_goes_idle() {
        let mut session = Session::new(AudioSettings::default(), false);
        session.playback.begin_loading();
        session.display = NowPlayingDisplay::loading();

        session.abandon_loading(PlaybackStatus::Loading);
        assert_eq!(session.playback.status, PlaybackStatus::Idle);
        assert_eq!(session.display, NowPlayingDisplay::idle());
    }

    #[test]
    fn abandon_loading_rebuilds_text_for_current_song() {
        let mut session = Session::new(AudioSettings::default(), false);
        session.playback.start_track(song("Song A"));
        session.playback.pause();
        session.playback.begin_loading();
        session.display = NowPlayingDisplay::loading();

        session.abandon_loading(PlaybackStatus::Paused);
        assert_eq!(session.playback.status, PlaybackStatus::Paused);
        assert_eq!(session.display.title, "Song A");
        assert_eq!(session.display.status_line, display::STATUS_PAUSED);
    }

    #[test]
    fn abandon_loading_leaves_host_state_alone() {
        let mut session = Session::new(AudioSettings::default(), false);
        session.playback.start_track(song("Song B"));
        session.display = NowPlayingDisplay::for_song(&song("Song B"));
        let before = session.display.clone();

        session.abandon_loading(PlaybackStatus::Idle);
        assert_eq!(session.playback.status, PlaybackStatus::Playing);
        assert_eq!(session.display, before);
    }

    #[test]
    fn loading_text_without_loading_status_is_cleared() {
        let mut session = Session::new(AudioSettings::default(), false);
        session.display = NowPlayingDisplay::loading();

        session.abandon_loading(PlaybackStatus::Idle);
        assert_eq!(session.display, NowPlayingDisplay::idle());
    }
}
