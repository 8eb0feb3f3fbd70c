//! Applies host events to the session in arrival order.
//!
//! Each event is applied atomically under the write lock. There is no
//! reordering or deduplication; the most recent event wins.

use std::sync::Arc;
use std::time::Instant;

use crate::artwork::{self, Artwork, ArtworkFetcher, ArtworkLoader};
use crate::display::{self, NowPlayingDisplay};
use crate::protocol::{HostConfig, HostEvent};
use crate::state::{Session, SharedState};
use crate::types::{DEFAULT_RANGE, DEFAULT_VOLUME};

pub struct EventDispatcher {
    state: SharedState,
    artwork: ArtworkLoader,
}

impl EventDispatcher {
    pub fn new(state: SharedState, fetcher: Arc<ArtworkFetcher>) -> Self {
        Self {
            state,
            artwork: ArtworkLoader::new(fetcher),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        log::debug!("Host event: {}", event.kind());
        let now = Instant::now();

        // Artwork work is started after the lock is released
        let mut thumbnail: Option<(String, u64)> = None;
        let mut cancel_artwork = false;

        {
            let mut session = self.state.write();

            match event {
                HostEvent::Open { config, queue } => {
                    log::info!("Overlay opened");
                    session.overlay_visible = true;
                    if let Some(config) = config {
                        apply_host_config(&mut session, &config);
                    }
                    if let Some(queue) = queue {
                        session.queue.apply_snapshot(queue);
                    }
                }
                HostEvent::Close => {
                    log::info!("Overlay closed");
                    session.overlay_visible = false;
                    session.reset();
                    cancel_artwork = true;
                }
                HostEvent::QueueUpdated { queue } => {
                    session.queue.apply_snapshot(queue);
                }
                HostEvent::Notification { message } => {
                    session.toasts.success(message);
                }
                HostEvent::Error { message } => {
                    log::warn!("Host reported error: {}", message);
                    session.toasts.error(message);
                }
                HostEvent::MusicStarted { song_info } => {
                    log::info!("Now playing: {} - {}", song_info.title, song_info.artist);
                    session.display = NowPlayingDisplay::for_song(&song_info);
                    session.artwork = Artwork::Placeholder;
                    session.artwork_generation += 1;
                    match artwork::loadable_url(song_info.thumbnail_url.as_deref()) {
                        Some(url) => thumbnail = Some((url.to_string(), session.artwork_generation)),
                        None => cancel_artwork = true,
                    }
                    session.playback.start_track(song_info);
                    session.progress_clock.anchor(now);
                }
                HostEvent::MusicStopped => {
                    session.playback.stop_track();
                    session.display = NowPlayingDisplay::idle();
                    session.artwork = Artwork::Placeholder;
                    session.artwork_generation += 1;
                    session.progress_clock.clear();
                    cancel_artwork = true;
                }
                HostEvent::MusicPaused => {
                    if session.playback.pause() {
                        session.display.set_status(display::STATUS_PAUSED);
                        session.progress_clock.anchor(now);
                    } else {
                        log::debug!("Pause ignored, no current song");
                    }
                }
                HostEvent::MusicResumed => {
                    if session.playback.resume() {
                        session.display.set_status(display::STATUS_PLAYING);
                        session.progress_clock.anchor(now);
                    } else {
                        log::debug!("Resume ignored, no current song");
                    }
                }
                HostEvent::MusicLoading => {
                    session.playback.begin_loading();
                    session.display.set_status(display::STATUS_LOADING);
                }
                HostEvent::UpdateProgress {
                    current_time,
                    duration,
                    is_paused,
                } => {
                    if session.playback.tick(current_time, duration, is_paused) {
                        match is_paused {
                            Some(true) => session.display.set_status(display::STATUS_PAUSED),
                            Some(false) => session.display.set_status(display::STATUS_PLAYING),
                            None => {}
                        }
                        session.progress_clock.anchor(now);
                    } else {
                        log::debug!("Progress ignored, no current song");
                    }
                }
                HostEvent::Unknown => {
                    log::debug!("Ignoring unknown host event");
                }
            }
        }

        if let Some((url, generation)) = thumbnail {
            self.artwork.load(url, generation, self.state.clone());
        } else if cancel_artwork {
            self.artwork.cancel();
        }
    }
}

/// Absent fields keep the defaults, present ones are clamped into range
fn apply_host_config(session: &mut Session, config: &HostConfig) {
    session.audio.volume = config
        .volume
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_VOLUME);
    session.audio.range = config
        .range
        .filter(|r| r.is_finite())
        .map(|r| r.round().max(0.0) as u32)
        .unwrap_or(DEFAULT_RANGE);
}
