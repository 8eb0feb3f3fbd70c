use std::time::Duration;

use thiserror::Error;

/// Message shown whenever the host could not be reached at all
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to communicate with game";

pub type Result<T> = std::result::Result<T, ControllerError>;

/// Failures of the command channel itself (the host never answered)
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("host channel is closed")]
    Closed,

    #[error("host dropped the request before acknowledging it")]
    Disconnected,

    #[error("no acknowledgment from host within {0:?}")]
    Timeout(Duration),

    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced to the user by command orchestration
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Missing or empty input; never reaches the host
    #[error("{0}")]
    Validation(String),

    /// Host answered with `success: false`
    #[error("{command} failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl ControllerError {
    /// Text for the error toast raised for this failure
    pub fn toast_message(&self) -> String {
        match self {
            ControllerError::Validation(message) => message.clone(),
            ControllerError::CommandFailed { message, .. } => message.clone(),
            ControllerError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
        }
    }
}
