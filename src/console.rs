//! Line-based front end used by the binary in place of a real overlay.
//!
//! Each input line is one user intent; state is printed after every change.

use crate::controller::Controller;
use crate::error::Result;
use crate::state::OverlayView;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Queue if something is playing, else play now
    Play(String),
    PlayNow(String),
    Queue(String),
    TogglePlayPause,
    Pause,
    Resume,
    Next,
    Previous,
    Stop,
    ClearQueue,
    Shuffle,
    Repeat,
    Remove(usize),
    /// Fraction of the progress bar, 0.0 to 1.0
    Seek(f64),
    Volume(i64),
    Range(i64),
    Settings,
    CloseSettings,
    Close,
    Status,
    Quit,
}

pub const HELP: &str = "commands: play <url> | now <url> | queue <url> | toggle | pause | resume | \
next | prev | stop | clear | shuffle | repeat | remove <n> | seek <0-1> | volume <0-100> | \
range <n> | settings | done | close | status | quit";

pub fn parse_intent(line: &str) -> std::result::Result<Intent, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let number = |what: &str| -> std::result::Result<i64, String> {
        rest.parse::<i64>()
            .map_err(|_| format!("{} expects a whole number", what))
    };

    let intent = match word {
        "play" => Intent::Play(rest.to_string()),
        "now" => Intent::PlayNow(rest.to_string()),
        "queue" => Intent::Queue(rest.to_string()),
        "toggle" | "space" => Intent::TogglePlayPause,
        "pause" => Intent::Pause,
        "resume" => Intent::Resume,
        "next" => Intent::Next,
        "prev" | "previous" => Intent::Previous,
        "stop" => Intent::Stop,
        "clear" => Intent::ClearQueue,
        "shuffle" => Intent::Shuffle,
        "repeat" => Intent::Repeat,
        "remove" => Intent::Remove(number("remove")?.max(0) as usize),
        "seek" => Intent::Seek(
            rest.parse::<f64>()
                .map_err(|_| "seek expects a fraction between 0 and 1".to_string())?,
        ),
        "volume" => Intent::Volume(number("volume")?),
        "range" => Intent::Range(number("range")?),
        "settings" => Intent::Settings,
        "done" => Intent::CloseSettings,
        "close" => Intent::Close,
        "status" | "" => Intent::Status,
        "quit" | "exit" => Intent::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(intent)
}

/// Run one intent. Failures are already surfaced as toasts by the controller.
pub async fn execute(controller: &Controller, intent: Intent) -> Result<()> {
    match intent {
        Intent::Play(url) => {
            controller.close_settings();
            controller.smart_play(&url).await
        }
        Intent::PlayNow(url) => {
            controller.close_settings();
            controller.play_now(&url).await
        }
        Intent::Queue(url) => {
            controller.close_settings();
            controller.add_to_queue(&url).await
        }
        Intent::TogglePlayPause => controller.toggle_play_pause().await,
        Intent::Pause => controller.pause().await,
        Intent::Resume => controller.resume().await,
        Intent::Next => controller.next_track().await,
        Intent::Previous => controller.previous_track().await,
        Intent::Stop => controller.stop().await,
        Intent::ClearQueue => controller.clear_queue().await,
        Intent::Shuffle => controller.toggle_shuffle().await,
        Intent::Repeat => controller.cycle_repeat_mode().await.map(|_| ()),
        Intent::Remove(index) => controller.remove_from_queue(index).await,
        Intent::Seek(fraction) => controller.seek_to_fraction(fraction).await.map(|_| ()),
        Intent::Volume(volume) => controller.set_volume(volume).await,
        Intent::Range(range) => {
            controller.set_range(range);
            Ok(())
        }
        Intent::Settings => {
            controller.open_settings();
            Ok(())
        }
        Intent::CloseSettings => {
            controller.close_settings();
            Ok(())
        }
        Intent::Close => controller.close().await,
        Intent::Status | Intent::Quit => Ok(()),
    }
}

pub fn render(view: &OverlayView) -> String {
    let mut out = String::new();

    if !view.visible {
        out.push_str("[overlay hidden]\n");
    }

    let state_icon = if view.is_playing { ">" } else { "||" };
    out.push_str(&format!(
        "{} {} - {}  {}\n",
        state_icon, view.title, view.artist, view.status_line
    ));
    out.push_str(&format!(
        "   {} / {} ({:.0}%)  vol {} range {}\n",
        view.progress_label, view.duration_label, view.progress_percent, view.volume, view.range
    ));
    out.push_str(&format!(
        "   queue: {}  {}  {}\n",
        view.queue_label, view.shuffle_label, view.repeat_label
    ));
    for item in &view.queue {
        let marker = if item.current { "*" } else { " " };
        out.push_str(&format!(
            "   {}{:>2}. {} - {}\n",
            marker, item.position, item.title, item.artist
        ));
    }
    if view.settings_open {
        out.push_str("   [settings open]\n");
    }
    for toast in &view.toasts {
        out.push_str(&format!("   ({:?}) {}\n", toast.severity, toast.message));
    }

    out
}
