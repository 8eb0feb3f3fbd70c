//! Client-side controller for an in-vehicle media overlay.
//!
//! The host process owns audio playback and is the source of truth. This
//! crate keeps a local view of its state in sync: commands go out through a
//! [`CommandChannel`], events come back through the [`EventDispatcher`], and
//! the [`Controller`] turns user intents into commands.

pub mod artwork;
pub mod channel;
pub mod config;
pub mod console;
pub mod controller;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod model;
pub mod progress;
pub mod protocol;
pub mod sidecar;
pub mod state;
pub mod toast;
pub mod types;

pub use channel::{CommandChannel, CommandRequest};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use dispatcher::EventDispatcher;
pub use error::{ControllerError, Result, TransportError};
pub use protocol::{Command, CommandAck, HostEvent};
pub use state::{create_state, Session, SharedState};
pub use types::{PlaybackState, PlaybackStatus, QueueState, RepeatMode, Song};
