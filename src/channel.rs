use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::error::TransportError;
use crate::protocol::{Command, CommandAck};

const REQUEST_BUFFER: usize = 64;

pub type AckResult = Result<CommandAck, TransportError>;

/// A command waiting to be delivered to the host
#[derive(Debug)]
pub struct CommandRequest {
    pub command: Command,
    pub reply: oneshot::Sender<AckResult>,
}

/// Typed, fire-and-forget envelope over the host's message endpoint.
///
/// Every call is a single request: no retries, no queuing beyond the
/// transport buffer, no payload interpretation. Calls that are never
/// acknowledged fail with [`TransportError::Timeout`].
#[derive(Clone, Debug)]
pub struct CommandChannel {
    tx: mpsc::Sender<CommandRequest>,
    timeout: Duration,
}

impl CommandChannel {
    /// Create a channel and the receiving end a transport must drain
    pub fn new(timeout: Duration) -> (Self, mpsc::Receiver<CommandRequest>) {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        (Self { tx, timeout }, rx)
    }

    pub async fn send(&self, command: Command) -> AckResult {
        let name = command.name();
        let (reply, response) = oneshot::channel();

        self.tx
            .send(CommandRequest { command, reply })
            .await
            .map_err(|_| TransportError::Closed)?;

        log::debug!("Sent {} to host", name);

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::Disconnected),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_ack_from_transport() {
        let (channel, mut rx) = CommandChannel::new(Duration::from_secs(5));
        tokio::spawn(async move {
            let request = rx.recv().await.unwrap();
            assert_eq!(request.command, Command::PlayNext);
            let _ = request.reply.send(Ok(CommandAck::failure("queue empty")));
        });

        let ack = channel.send(Command::PlayNext).await.unwrap();
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("queue empty"));
    }

    #[tokio::test]
    async fn closed_transport_is_reported() {
        let (channel, rx) = CommandChannel::new(Duration::from_secs(5));
        drop(rx);
        let err = channel.send(Command::PauseMusic).await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn dropped_reply_is_a_disconnect() {
        let (channel, mut rx) = CommandChannel::new(Duration::from_secs(5));
        tokio::spawn(async move {
            let request = rx.recv().await.unwrap();
            drop(request);
        });
        let err = channel.send(Command::PauseMusic).await.unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_command_times_out() {
        let (channel, mut rx) = CommandChannel::new(Duration::from_secs(10));
        let holder = tokio::spawn(async move {
            let request = rx.recv().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(request);
        });

        let err = channel.send(Command::ResumeMusic).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_secs(10)));
        holder.abort();
    }
}
