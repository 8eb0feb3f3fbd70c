use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::channel::{AckResult, CommandRequest};
use crate::error::TransportError;
use crate::protocol::{CommandAck, HostEvent};

type PendingAcks = Arc<Mutex<HashMap<u64, oneshot::Sender<AckResult>>>>;

/// One line from the host: an acknowledgment or an event
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostLine {
    Ack {
        ack: u64,
        success: bool,
        #[serde(default)]
        error: Option<String>,
    },
    Event(HostEvent),
}

/// Manages the host process and bridges it to the command channel.
///
/// Commands go out as one JSON envelope per line on the host's stdin.
/// Acknowledgments and events come back as JSON lines on its stdout.
#[derive(Clone)]
pub struct HostProcess {
    child: Arc<Mutex<Option<Child>>>,
    pending: PendingAcks,
    next_id: Arc<AtomicU64>,
}

impl Default for HostProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProcess {
    pub fn new() -> Self {
        Self {
            child: Arc::new(Mutex::new(None)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Spawn the host and start the writer and reader threads
    pub fn spawn(
        &self,
        program: &str,
        args: &[String],
        requests: mpsc::Receiver<CommandRequest>,
        events: mpsc::UnboundedSender<HostEvent>,
    ) -> Result<()> {
        log::info!("Spawning host process: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn host process {}", program))?;

        log::info!("Host process spawned with PID: {}", child.id());

        let stdin = child.stdin.take().context("Failed to capture host stdin")?;
        let stdout = child
            .stdout
            .take()
            .context("Failed to capture host stdout")?;
        let stderr = child
            .stderr
            .take()
            .context("Failed to capture host stderr")?;

        *self.child.lock() = Some(child);

        // Writer thread (command envelopes)
        let pending = self.pending.clone();
        let next_id = self.next_id.clone();
        thread::spawn(move || {
            Self::write_commands(stdin, requests, pending, next_id);
        });

        // Reader thread (acks and events)
        let pending = self.pending.clone();
        thread::spawn(move || {
            Self::read_stdout(stdout, pending, events);
        });

        // Reader thread (host logs)
        thread::spawn(move || {
            Self::read_stderr(stderr);
        });

        Ok(())
    }

    fn write_commands(
        mut stdin: ChildStdin,
        mut requests: mpsc::Receiver<CommandRequest>,
        pending: PendingAcks,
        next_id: Arc<AtomicU64>,
    ) {
        while let Some(CommandRequest { command, reply }) = requests.blocking_recv() {
            let id = next_id.fetch_add(1, Ordering::Relaxed);
            let line = match serde_json::to_string(&command.envelope(id)) {
                Ok(line) => line,
                Err(e) => {
                    let _ = reply.send(Err(TransportError::Encode(e)));
                    continue;
                }
            };

            log::debug!("Host stdin: {}", line);
            pending.lock().insert(id, reply);

            if let Err(e) = writeln!(stdin, "{}", line).and_then(|_| stdin.flush()) {
                log::error!("Error writing to host stdin: {}", e);
                if let Some(reply) = pending.lock().remove(&id) {
                    let _ = reply.send(Err(TransportError::Io(e)));
                }
                break;
            }
        }

        log::warn!("Host command writer stopped");
    }

    fn read_stdout(
        stdout: std::process::ChildStdout,
        pending: PendingAcks,
        events: mpsc::UnboundedSender<HostEvent>,
    ) {
        let reader = BufReader::new(stdout);

        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    log::debug!("Host stdout: {}", line);

                    match serde_json::from_str::<HostLine>(&line) {
                        Ok(HostLine::Ack { ack, success, error }) => {
                            match pending.lock().remove(&ack) {
                                Some(reply) => {
                                    let _ = reply.send(Ok(CommandAck { success, error }));
                                }
                                None => log::warn!("Acknowledgment for unknown command {}", ack),
                            }
                        }
                        Ok(HostLine::Event(event)) => {
                            if events.send(event).is_err() {
                                log::warn!("Event receiver dropped, host event discarded");
                            }
                        }
                        Err(e) => {
                            log::error!("Failed to parse host message: {} - {}", e, line);
                        }
                    }
                }
                Err(e) => {
                    log::error!("Error reading host stdout: {}", e);
                    break;
                }
            }
        }

        // Nobody will answer the outstanding commands now
        pending.lock().clear();
        log::warn!("Host stdout reader stopped");
    }

    fn read_stderr(stderr: std::process::ChildStderr) {
        let reader = BufReader::new(stderr);

        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        log::info!("[Host] {}", line);
                    }
                }
                Err(e) => {
                    log::error!("Error reading host stderr: {}", e);
                    break;
                }
            }
        }

        log::warn!("Host stderr reader stopped");
    }

    /// Check if the host is still running
    pub fn is_running(&self) -> bool {
        let mut child_guard = self.child.lock();
        if let Some(child) = child_guard.as_mut() {
            match child.try_wait() {
                Ok(Some(_status)) => {
                    log::warn!("Host process has exited");
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    log::error!("Error checking host status: {}", e);
                    false
                }
            }
        } else {
            false
        }
    }

    /// Stop the host process: SIGTERM, up to 2 seconds of grace, then kill
    pub fn stop(&self) -> Result<()> {
        let child_option = self.child.lock().take();
        if let Some(mut child) = child_option {
            log::info!("Stopping host process with PID {}...", child.id());

            #[cfg(unix)]
            {
                let pid = child.id();
                let _ = Command::new("kill")
                    .arg("-TERM")
                    .arg(pid.to_string())
                    .output();
            }

            #[cfg(windows)]
            {
                child.kill().ok();
            }

            let max_wait_ms = 2000;
            let check_interval_ms = 100;
            let mut waited_ms = 0;

            while waited_ms < max_wait_ms {
                thread::sleep(Duration::from_millis(check_interval_ms));
                waited_ms += check_interval_ms;

                match child.try_wait() {
                    Ok(Some(status)) => {
                        log::info!("Host process exited with status: {:?}", status);
                        return Ok(());
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        log::error!("Error checking host status: {}", e);
                        break;
                    }
                }
            }

            log::warn!("Host didn't stop after {}ms, killing it", max_wait_ms);
            child.kill().context("Failed to kill host process")?;
            child.wait().context("Failed to wait for host process")?;
            log::info!("Host process forcefully terminated");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::CommandChannel;
    use crate::protocol::Command;

    #[test]
    fn parses_acks_and_events() {
        let ack: HostLine =
            serde_json::from_str(r#"{"ack":3,"success":false,"error":"nope"}"#).unwrap();
        assert!(matches!(
            ack,
            HostLine::Ack { ack: 3, success: false, error: Some(ref e) } if e == "nope"
        ));

        let event: HostLine = serde_json::from_str(r#"{"type":"musicPaused"}"#).unwrap();
        assert!(matches!(event, HostLine::Event(HostEvent::MusicPaused)));

        assert!(serde_json::from_str::<HostLine>(r#"{"hello":1}"#).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn round_trips_through_a_real_process() {
        let script = r#"read line; echo '{"ack":1,"success":true}'; echo '{"type":"musicStopped"}'"#;
        let (channel, requests) = CommandChannel::new(Duration::from_secs(5));
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let host = HostProcess::new();
        host.spawn("sh", &["-c".to_string(), script.to_string()], requests, events_tx)
            .unwrap();

        let ack = channel.send(Command::StopMusic).await.unwrap();
        assert!(ack.success);
        assert_eq!(events_rx.recv().await, Some(HostEvent::MusicStopped));

        // Host has exited; later commands cannot be answered
        let err = channel.send(Command::PlayNext).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Disconnected
                | TransportError::Io(_)
                | TransportError::Closed
                | TransportError::Timeout(_)
        ));

        host.stop().unwrap();
    }
}
