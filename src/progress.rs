//! Progress shown between host ticks.
//!
//! By default the displayed value is the model's value verbatim. With
//! interpolation enabled the clock extrapolates from the last authoritative
//! write, but never stores the result: the next write re-anchors it and the
//! extrapolated value is discarded.

use std::time::Instant;

use crate::types::PlaybackState;

#[derive(Debug, Clone)]
pub struct ProgressClock {
    interpolate: bool,
    anchored_at: Option<Instant>,
}

impl ProgressClock {
    pub fn new(interpolate: bool) -> Self {
        Self {
            interpolate,
            anchored_at: None,
        }
    }

    /// Record that the model's progress was just written
    pub fn anchor(&mut self, now: Instant) {
        self.anchored_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.anchored_at = None;
    }

    pub fn displayed(&self, playback: &PlaybackState, now: Instant) -> f64 {
        let base = playback.progress_seconds;
        if !self.interpolate || !playback.is_playing() {
            return base;
        }
        match self.anchored_at {
            Some(at) => {
                let elapsed = now.saturating_duration_since(at).as_secs_f64();
                (base + elapsed).min(playback.duration_seconds)
            }
            None => base,
        }
    }
}
