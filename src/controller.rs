//! Turns user intents into host commands.
//!
//! The controller is a cheap-to-clone context object: it carries the shared
//! session and the command channel to whichever component needs them. Every
//! intent surfaces its own failure as a toast and returns it as well.

use std::time::Instant;

use crate::channel::CommandChannel;
use crate::display::NowPlayingDisplay;
use crate::error::{ControllerError, Result};
use crate::protocol::{Command, PlayRequest};
use crate::state::SharedState;
use crate::types::RepeatMode;

pub const EMPTY_URL_MESSAGE: &str = "Please enter a YouTube URL";
pub const INVALID_POSITION_MESSAGE: &str = "Invalid queue position";
pub const ADDED_TO_QUEUE_MESSAGE: &str = "Added to queue";
pub const QUEUE_CLEARED_MESSAGE: &str = "Queue cleared";

/// Fallback text when the host rejects a command without saying why.
/// `None` marks commands whose failures are only logged.
fn failure_message(command: &Command) -> Option<&'static str> {
    match command {
        Command::PlayMusic(_) => Some("Failed to play music"),
        Command::AddToQueue(_) => Some("Failed to add to queue"),
        Command::PauseMusic => Some("Failed to pause music"),
        Command::ResumeMusic => Some("Failed to resume music"),
        Command::StopMusic => Some("Failed to stop music"),
        Command::PlayNext => Some("No next song available"),
        Command::ClearQueue => Some("Failed to clear queue"),
        Command::ToggleShuffle => Some("Failed to toggle shuffle"),
        Command::SetRepeatMode { .. } => Some("Failed to set repeat mode"),
        Command::RemoveFromQueue { .. } => Some("Failed to remove from queue"),
        Command::SeekMusic { .. } => Some("Failed to seek"),
        Command::SetVolume { .. } | Command::Close => None,
    }
}

/// Seek position for a click at `fraction` of the progress bar
pub fn seek_target(fraction: f64, duration: f64) -> f64 {
    let fraction = if fraction.is_finite() { fraction } else { 0.0 };
    (fraction * duration).clamp(0.0, duration.max(0.0))
}

#[derive(Clone)]
pub struct Controller {
    state: SharedState,
    channel: CommandChannel,
}

impl Controller {
    pub fn new(state: SharedState, channel: CommandChannel) -> Self {
        Self { state, channel }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Send a command and turn anything but a success acknowledgment into an error.
    /// Surfaced failures raise exactly one error toast.
    async fn run(&self, command: Command) -> Result<()> {
        let name = command.name();
        let fallback = failure_message(&command);

        let err = match self.channel.send(command).await {
            Ok(ack) if ack.success => {
                log::debug!("{} acknowledged", name);
                return Ok(());
            }
            Ok(ack) => {
                let message = ack
                    .error
                    .filter(|e| !e.is_empty())
                    .or_else(|| fallback.map(str::to_string))
                    .unwrap_or_else(|| format!("{} failed", name));
                log::warn!("Host rejected {}: {}", name, message);
                ControllerError::CommandFailed {
                    command: name,
                    message,
                }
            }
            Err(e) => {
                log::error!("Error sending {} to host: {}", name, e);
                ControllerError::Transport(e)
            }
        };

        if fallback.is_some() {
            self.state.write().toasts.error(err.toast_message());
        }
        Err(err)
    }

    fn reject(&self, message: &str) -> ControllerError {
        self.state.write().toasts.error(message);
        ControllerError::Validation(message.to_string())
    }

    fn validated_url(&self, input: &str) -> Result<String> {
        let url = input.trim();
        if url.is_empty() {
            return Err(self.reject(EMPTY_URL_MESSAGE));
        }
        Ok(url.to_string())
    }

    /// Queue when something is already playing, otherwise play immediately
    pub async fn smart_play(&self, input: &str) -> Result<()> {
        self.play_with_url(input, None).await
    }

    pub async fn play_now(&self, input: &str) -> Result<()> {
        self.play_with_url(input, Some(true)).await
    }

    pub async fn add_to_queue(&self, input: &str) -> Result<()> {
        self.play_with_url(input, Some(false)).await
    }

    async fn play_with_url(&self, input: &str, play_now: Option<bool>) -> Result<()> {
        let url = self.validated_url(input)?;

        // Decide and set the optimistic state in one critical section
        let (command, rollback) = {
            let mut session = self.state.write();
            let play_now = play_now.unwrap_or(!session.playback.is_playing());
            let request = PlayRequest {
                url,
                volume: session.audio.volume,
                range: session.audio.range,
                looped: false,
                play_now,
            };

            if play_now {
                let rollback = session.playback.status;
                session.playback.begin_loading();
                session.display = NowPlayingDisplay::loading();
                (Command::PlayMusic(request), Some(rollback))
            } else {
                (Command::AddToQueue(request), None)
            }
        };

        match self.run(command).await {
            Ok(()) => {
                if rollback.is_none() {
                    self.state.write().toasts.success(ADDED_TO_QUEUE_MESSAGE);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(previous) = rollback {
                    self.state.write().abandon_loading(previous);
                }
                Err(e)
            }
        }
    }

    /// Pause if playing, resume if a song is loaded, otherwise open settings
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let (playing, has_song) = {
            let session = self.state.read();
            (
                session.playback.is_playing(),
                session.playback.current_song.is_some(),
            )
        };

        if playing {
            self.pause().await
        } else if has_song {
            self.resume().await
        } else {
            self.open_settings();
            Ok(())
        }
    }

    pub async fn pause(&self) -> Result<()> {
        self.run(Command::PauseMusic).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.run(Command::ResumeMusic).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.run(Command::StopMusic).await
    }

    pub async fn next_track(&self) -> Result<()> {
        self.run(Command::PlayNext).await
    }

    /// The host has no "previous" command; going back stops playback
    pub async fn previous_track(&self) -> Result<()> {
        self.stop().await
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.run(Command::ClearQueue).await?;
        self.state.write().toasts.success(QUEUE_CLEARED_MESSAGE);
        Ok(())
    }

    /// State changes only when the host's next queue snapshot arrives
    pub async fn toggle_shuffle(&self) -> Result<()> {
        self.run(Command::ToggleShuffle).await
    }

    /// Request the mode after the current one. Like shuffle, the local queue
    /// is left alone until the host confirms with a snapshot.
    pub async fn cycle_repeat_mode(&self) -> Result<RepeatMode> {
        let requested = self.state.read().queue.repeat_mode.next();
        self.run(Command::SetRepeatMode { mode: requested }).await?;
        Ok(requested)
    }

    /// `index` is the 1-based queue position
    pub async fn remove_from_queue(&self, index: usize) -> Result<()> {
        if index == 0 {
            return Err(self.reject(INVALID_POSITION_MESSAGE));
        }
        self.run(Command::RemoveFromQueue { index }).await
    }

    /// Seek to `fraction` of the current track. Local progress moves only
    /// once the host acknowledges. Returns the requested time, or `None`
    /// when nothing is loaded.
    pub async fn seek_to_fraction(&self, fraction: f64) -> Result<Option<f64>> {
        let target = {
            let session = self.state.read();
            if session.playback.current_song.is_none() {
                return Ok(None);
            }
            seek_target(fraction, session.playback.duration_seconds)
        };

        self.run(Command::SeekMusic { time: target }).await?;

        let mut session = self.state.write();
        if session.playback.seek_to(target) {
            session.progress_clock.anchor(Instant::now());
        }
        Ok(Some(target))
    }

    /// Live volume change; failures are only logged
    pub async fn set_volume(&self, volume: i64) -> Result<()> {
        let volume = volume.clamp(0, 100) as u8;
        self.state.write().audio.volume = volume;
        self.run(Command::SetVolume { volume }).await
    }

    /// Takes effect with the next play command
    pub fn set_range(&self, range: i64) {
        self.state.write().audio.range = u32::try_from(range.max(0)).unwrap_or(u32::MAX);
    }

    /// Ask the host to close the overlay; the `close` event does the rest
    pub async fn close(&self) -> Result<()> {
        self.run(Command::Close).await
    }

    pub fn open_settings(&self) {
        self.state.write().settings_open = true;
    }

    pub fn close_settings(&self) {
        self.state.write().settings_open = false;
    }
}
