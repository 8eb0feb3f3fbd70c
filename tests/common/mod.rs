//! Test harness: a controller wired to a host that the test answers by hand.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dashplay::artwork::ArtworkFetcher;
use dashplay::channel::CommandRequest;
use dashplay::types::AudioSettings;
use dashplay::{
    create_state, Command, CommandAck, CommandChannel, Controller, EventDispatcher, HostEvent,
    SharedState,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

pub struct Harness {
    pub controller: Controller,
    pub dispatcher: EventDispatcher,
    pub state: SharedState,
    pub requests: mpsc::Receiver<CommandRequest>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let state = create_state(AudioSettings::default(), false);
        let (channel, requests) = CommandChannel::new(timeout);
        let fetcher = Arc::new(ArtworkFetcher::new(16).expect("artwork fetcher"));
        Self {
            controller: Controller::new(state.clone(), channel),
            dispatcher: EventDispatcher::new(state.clone(), fetcher),
            state,
            requests,
        }
    }

    /// Deliver a host event given as wire JSON
    pub fn host_sends(&mut self, event: Value) {
        let event: HostEvent = serde_json::from_value(event).expect("valid host event");
        self.dispatcher.dispatch(event);
    }

    /// Take the next outbound command without answering it yet
    pub async fn next_request(&mut self) -> CommandRequest {
        self.requests.recv().await.expect("controller sent a command")
    }

    /// Take the next outbound command and answer it
    pub async fn answer(&mut self, ack: CommandAck) -> Command {
        let request = self.next_request().await;
        let _ = request.reply.send(Ok(ack));
        request.command
    }

    pub fn no_command_sent(&mut self) -> bool {
        self.requests.try_recv().is_err()
    }

    pub fn error_toasts(&self) -> Vec<String> {
        self.toasts_with(dashplay::toast::Severity::Error)
    }

    pub fn success_toasts(&self) -> Vec<String> {
        self.toasts_with(dashplay::toast::Severity::Success)
    }

    fn toasts_with(&self, severity: dashplay::toast::Severity) -> Vec<String> {
        self.state
            .read()
            .toasts
            .iter()
            .filter(|t| t.severity == severity)
            .map(|t| t.message.clone())
            .collect()
    }

    /// Put the player into a playing state via host events
    pub fn start_song(&mut self, title: &str, duration: u32) {
        self.host_sends(json!({
            "type": "musicStarted",
            "songInfo": { "title": title, "artist": "Artist", "durationSeconds": duration }
        }));
    }

    pub fn queue_of(&mut self, titles: &[&str], current_index: i64) {
        let songs: Vec<Value> = titles
            .iter()
            .map(|t| json!({ "title": t, "artist": "Artist", "duration": 200 }))
            .collect();
        self.host_sends(json!({
            "type": "queueUpdated",
            "queue": { "songs": songs, "currentIndex": current_index, "shuffle": false, "repeatMode": "none" }
        }));
    }
}
