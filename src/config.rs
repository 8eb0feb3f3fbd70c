use std::str::FromStr;
use std::time::Duration;

use crate::types::{AudioSettings, DEFAULT_RANGE, DEFAULT_VOLUME};

pub const HOST_CMD_VAR: &str = "DASHPLAY_HOST_CMD";
pub const HOST_ARGS_VAR: &str = "DASHPLAY_HOST_ARGS";
pub const COMMAND_TIMEOUT_VAR: &str = "DASHPLAY_COMMAND_TIMEOUT_MS";
pub const VOLUME_VAR: &str = "DASHPLAY_VOLUME";
pub const RANGE_VAR: &str = "DASHPLAY_RANGE";
pub const INTERPOLATE_VAR: &str = "DASHPLAY_INTERPOLATE_PROGRESS";
pub const ARTWORK_SIZE_VAR: &str = "DASHPLAY_ARTWORK_SIZE";

const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_ARTWORK_SIZE: u32 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Host executable; required by the binary only
    pub host_command: Option<String>,
    pub host_args: Vec<String>,
    pub command_timeout: Duration,
    pub audio: AudioSettings,
    pub interpolate_progress: bool,
    pub artwork_size: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host_command: None,
            host_args: Vec::new(),
            command_timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            audio: AudioSettings::default(),
            interpolate_progress: false,
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Bad values fall back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_command = lookup(HOST_CMD_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let host_args = lookup(HOST_ARGS_VAR)
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let timeout_ms: u64 = parse_or(&lookup, COMMAND_TIMEOUT_VAR, DEFAULT_COMMAND_TIMEOUT_MS);
        let volume: i64 = parse_or(&lookup, VOLUME_VAR, DEFAULT_VOLUME as i64);
        let range: i64 = parse_or(&lookup, RANGE_VAR, DEFAULT_RANGE as i64);
        let artwork_size: u32 = parse_or(&lookup, ARTWORK_SIZE_VAR, DEFAULT_ARTWORK_SIZE);

        Self {
            host_command,
            host_args,
            command_timeout: Duration::from_millis(timeout_ms.max(1)),
            audio: AudioSettings {
                volume: volume.clamp(0, 100) as u8,
                range: u32::try_from(range.max(0)).unwrap_or(u32::MAX),
            },
            interpolate_progress: parse_or(&lookup, INTERPOLATE_VAR, false),
            artwork_size: artwork_size.max(1),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Invalid value {:?} for {}, using {:?}", raw, key, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ControllerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), ControllerConfig::default());
    }

    #[test]
    fn reads_and_clamps_values() {
        let config = config_from(&[
            (HOST_CMD_VAR, "node"),
            (HOST_ARGS_VAR, "host/index.js --quiet"),
            (COMMAND_TIMEOUT_VAR, "2500"),
            (VOLUME_VAR, "140"),
            (RANGE_VAR, "-5"),
            (INTERPOLATE_VAR, "true"),
        ]);

        assert_eq!(config.host_command.as_deref(), Some("node"));
        assert_eq!(config.host_args, vec!["host/index.js", "--quiet"]);
        assert_eq!(config.command_timeout, Duration::from_millis(2500));
        assert_eq!(config.audio.volume, 100);
        assert_eq!(config.audio.range, 0);
        assert!(config.interpolate_progress);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            (COMMAND_TIMEOUT_VAR, "soon"),
            (VOLUME_VAR, "loud"),
            (INTERPOLATE_VAR, "yes"),
        ]);
        assert_eq!(config.command_timeout, Duration::from_secs(10));
        assert_eq!(config.audio.volume, DEFAULT_VOLUME);
        assert!(!config.interpolate_progress);
    }

    #[test]
    fn huge_range_saturates() {
        let config = config_from(&[(RANGE_VAR, "5000000000")]);
        assert_eq!(config.audio.range, u32::MAX);
    }
}
