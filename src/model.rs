//! Playback state model transitions.
//!
//! All transitions are synchronous and infallible. They never reorder or
//! merge: the last write wins.

use crate::protocol::QueueSnapshot;
use crate::types::{
    PlaybackState, PlaybackStatus, QueueState, RepeatMode, Song, DEFAULT_DURATION_SECS,
};

/// Duration to use for a song, falling back when the host reports none
pub fn effective_duration(reported: Option<f64>) -> f64 {
    match reported {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        _ => DEFAULT_DURATION_SECS,
    }
}

fn clamp_progress(secs: f64, duration: f64) -> f64 {
    if secs.is_finite() {
        secs.clamp(0.0, duration)
    } else {
        0.0
    }
}

impl RepeatMode {
    /// Repeat-mode cycle: none -> one -> all -> none
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

impl QueueState {
    /// Replace the queue wholesale, clamping the index into `[0, songs.len()]`
    pub fn apply_snapshot(&mut self, snapshot: QueueSnapshot) {
        let len = snapshot.songs.len();
        let current_index = snapshot.current_index.clamp(0, len as i64) as usize;
        if current_index as i64 != snapshot.current_index {
            log::warn!(
                "Host sent queue index {} for {} songs, clamped to {}",
                snapshot.current_index,
                len,
                current_index
            );
        }

        *self = QueueState {
            songs: snapshot.songs,
            current_index,
            shuffle: snapshot.shuffle,
            repeat_mode: snapshot.repeat_mode,
        };
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current_index
            .checked_sub(1)
            .and_then(|i| self.songs.get(i))
    }
}

impl PlaybackState {
    /// First half of a play: the command is out, nothing confirmed yet
    pub fn begin_loading(&mut self) {
        self.status = PlaybackStatus::Loading;
    }

    /// Undo [`begin_loading`](Self::begin_loading) if nothing has replaced it since
    pub fn cancel_loading(&mut self, previous: PlaybackStatus) {
        if self.status == PlaybackStatus::Loading {
            self.status = previous;
        }
    }

    /// Host confirmed a new track
    pub fn start_track(&mut self, song: Song) {
        self.duration_seconds = effective_duration(song.duration_seconds);
        self.progress_seconds = 0.0;
        self.current_song = Some(song);
        self.status = PlaybackStatus::Playing;
    }

    pub fn stop_track(&mut self) {
        *self = PlaybackState::default();
    }

    /// Returns false when there is no song to pause
    pub fn pause(&mut self) -> bool {
        if self.current_song.is_none() {
            return false;
        }
        self.status = PlaybackStatus::Paused;
        true
    }

    /// Returns false when there is no song to resume
    pub fn resume(&mut self) -> bool {
        if self.current_song.is_none() {
            return false;
        }
        self.status = PlaybackStatus::Playing;
        true
    }

    /// Authoritative progress from the host. Absent fields mean "no change".
    ///
    /// Ignored while no song is loaded, since an idle player has no progress.
    pub fn tick(
        &mut self,
        progress_seconds: Option<f64>,
        duration_seconds: Option<f64>,
        is_paused: Option<bool>,
    ) -> bool {
        if self.current_song.is_none() {
            return false;
        }

        if let Some(duration) = duration_seconds.filter(|d| d.is_finite() && *d > 0.0) {
            self.duration_seconds = duration;
        }
        if let Some(progress) = progress_seconds {
            self.progress_seconds = progress;
        }
        self.progress_seconds = clamp_progress(self.progress_seconds, self.duration_seconds);

        match is_paused {
            Some(true) => self.status = PlaybackStatus::Paused,
            Some(false) => self.status = PlaybackStatus::Playing,
            None => {}
        }
        true
    }

    /// Local write after an acknowledged seek
    pub fn seek_to(&mut self, seconds: f64) -> bool {
        if self.current_song.is_none() {
            return false;
        }
        self.progress_seconds = clamp_progress(seconds, self.duration_seconds);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(duration: Option<f64>) -> Song {
        Song {
            title: "Song A".to_string(),
            artist: "Artist".to_string(),
            duration_seconds: duration,
            thumbnail_url: None,
        }
    }

    fn snapshot(len: usize, current_index: i64) -> QueueSnapshot {
        QueueSnapshot {
            songs: (0..len).map(|_| song(Some(100.0))).collect(),
            current_index,
            shuffle: false,
            repeat_mode: RepeatMode::Off,
        }
    }

    #[test]
    fn duration_falls_back_when_missing_or_zero() {
        let mut state = PlaybackState::default();
        state.start_track(song(Some(0.0)));
        assert_eq!(state.duration_seconds, 180.0);

        state.start_track(song(None));
        assert_eq!(state.duration_seconds, 180.0);

        state.start_track(song(Some(240.0)));
        assert_eq!(state.duration_seconds, 240.0);
    }

    #[test]
    fn start_then_stop_returns_to_initial_state() {
        let mut state = PlaybackState::default();
        state.start_track(song(Some(240.0)));
        state.tick(Some(30.0), None, None);
        state.stop_track();
        assert_eq!(state, PlaybackState::default());
    }

    #[test]
    fn started_track_is_playing_with_song() {
        let mut state = PlaybackState::default();
        state.begin_loading();
        assert!(!state.is_playing());
        state.start_track(song(Some(200.0)));
        assert!(state.is_playing());
        assert!(state.current_song.is_some());
        assert_eq!(state.progress_seconds, 0.0);
    }

    #[test]
    fn tick_is_idempotent() {
        let mut once = PlaybackState::default();
        once.start_track(song(Some(200.0)));
        once.tick(Some(50.0), Some(210.0), Some(false));

        let mut twice = once.clone();
        twice.tick(Some(50.0), Some(210.0), Some(false));
        assert_eq!(once, twice);
    }

    #[test]
    fn tick_updates_only_present_fields() {
        let mut state = PlaybackState::default();
        state.start_track(song(Some(200.0)));
        state.tick(Some(42.0), None, None);
        assert_eq!(state.progress_seconds, 42.0);
        assert_eq!(state.duration_seconds, 200.0);
        assert!(state.is_playing());

        state.tick(None, None, Some(true));
        assert_eq!(state.progress_seconds, 42.0);
        assert_eq!(state.status, PlaybackStatus::Paused);
    }

    #[test]
    fn tick_clamps_progress_into_duration() {
        let mut state = PlaybackState::default();
        state.start_track(song(Some(100.0)));
        state.tick(Some(150.0), None, None);
        assert_eq!(state.progress_seconds, 100.0);
        state.tick(Some(-3.0), None, None);
        assert_eq!(state.progress_seconds, 0.0);

        state.tick(Some(90.0), None, None);
        state.tick(None, Some(60.0), None);
        assert_eq!(state.progress_seconds, 60.0);
    }

    #[test]
    fn idle_player_ignores_ticks_and_transport_events() {
        let mut state = PlaybackState::default();
        assert!(!state.tick(Some(12.0), Some(300.0), Some(false)));
        assert!(!state.resume());
        assert!(!state.pause());
        assert_eq!(state, PlaybackState::default());
    }

    #[test]
    fn cancel_loading_only_undoes_loading() {
        let mut state = PlaybackState::default();
        state.begin_loading();
        state.cancel_loading(PlaybackStatus::Idle);
        assert_eq!(state.status, PlaybackStatus::Idle);

        state.start_track(song(Some(100.0)));
        state.cancel_loading(PlaybackStatus::Idle);
        assert_eq!(state.status, PlaybackStatus::Playing);
    }

    #[test]
    fn repeat_cycle_has_period_three() {
        for mode in [RepeatMode::Off, RepeatMode::One, RepeatMode::All] {
            assert_ne!(mode.next(), mode);
            assert_eq!(mode.next().next().next(), mode);
        }
        assert_eq!(RepeatMode::Off.next(), RepeatMode::One);
        assert_eq!(RepeatMode::One.next(), RepeatMode::All);
        assert_eq!(RepeatMode::All.next(), RepeatMode::Off);
    }

    #[test]
    fn snapshot_index_is_clamped() {
        let mut queue = QueueState::default();

        queue.apply_snapshot(snapshot(3, 2));
        assert_eq!(queue.current_index, 2);
        assert!(queue.current_song().is_some());

        queue.apply_snapshot(snapshot(3, 9));
        assert_eq!(queue.current_index, 3);

        queue.apply_snapshot(snapshot(2, -4));
        assert_eq!(queue.current_index, 0);
        assert!(queue.current_song().is_none());

        queue.apply_snapshot(snapshot(0, 1));
        assert_eq!(queue.current_index, 0);
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut queue = QueueState::default();
        queue.apply_snapshot(QueueSnapshot {
            songs: vec![song(None)],
            current_index: 1,
            shuffle: true,
            repeat_mode: RepeatMode::All,
        });
        queue.apply_snapshot(snapshot(0, 0));
        assert_eq!(queue, QueueState::default());
    }
}
