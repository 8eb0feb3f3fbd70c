use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use dashplay::artwork::ArtworkFetcher;
use dashplay::config::{ControllerConfig, HOST_CMD_VAR};
use dashplay::console::{self, Intent};
use dashplay::sidecar::HostProcess;
use dashplay::{create_state, CommandChannel, Controller, EventDispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting dashplay overlay controller");

    let config = ControllerConfig::from_env();
    let host_command = config
        .host_command
        .clone()
        .with_context(|| format!("{} is not set", HOST_CMD_VAR))?;

    let state = create_state(config.audio, config.interpolate_progress);
    let (channel, requests) = CommandChannel::new(config.command_timeout);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let host = HostProcess::new();
    host.spawn(&host_command, &config.host_args, requests, events_tx)
        .context("Failed to start host")?;

    // Setup signal handler for Ctrl+C (SIGINT)
    let host_for_signal = host.clone();
    ctrlc::set_handler(move || {
        log::info!("Received interrupt signal (Ctrl+C), stopping host...");
        if let Err(e) = host_for_signal.stop() {
            log::error!("Error stopping host on interrupt: {}", e);
        }
        std::process::exit(0);
    })
    .context("Failed to set Ctrl+C handler")?;

    let fetcher = Arc::new(ArtworkFetcher::new(config.artwork_size)?);
    let mut dispatcher = EventDispatcher::new(state.clone(), fetcher);
    let controller = Controller::new(state.clone(), channel);

    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut housekeeping = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            Some(event) = events_rx.recv() => {
                dispatcher.dispatch(event);
                print!("{}", console::render(&state.read().view(Instant::now())));
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Error reading stdin: {}", e);
                        break;
                    }
                };

                match console::parse_intent(&line) {
                    Ok(Intent::Quit) => break,
                    Ok(Intent::Status) => {
                        print!("{}", console::render(&state.read().view(Instant::now())));
                    }
                    Ok(intent) => {
                        // Commands run concurrently so host events keep flowing while one awaits its ack
                        let controller = controller.clone();
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(e) = console::execute(&controller, intent).await {
                                log::debug!("Intent failed: {}", e);
                            }
                            print!("{}", console::render(&state.read().view(Instant::now())));
                        });
                    }
                    Err(message) => println!("{}\n{}", message, console::HELP),
                }
            }
            _ = housekeeping.tick() => {
                state.write().toasts.expire(Instant::now());
                if !host.is_running() {
                    log::warn!("Host is gone, shutting down");
                    break;
                }
            }
        }
    }

    log::info!("Shutting down");
    host.stop()?;
    Ok(())
}
