use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use coflow_core::{
    CrossfadeSettings, EngineSettings, SnapshotSettings,
    diagnostics::{DEFAULT_LOG_FILTER, DEFAULT_LOG_PREFIX},
    render::DEFAULT_FRAME_RATE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "coflow.config.toml";
pub const CONFIG_PATH_ENV: &str = "COFLOW_CONFIG_PATH";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub mode: AppMode,
    pub content: ContentConfig,
    pub player: PlayerConfig,
    pub snapshot: SnapshotConfig,
    pub diagnostics: DiagnosticsConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContentConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    pub crossfade_ms: u64,
    pub crossfade_steps: u32,
    pub frame_rate: u32,
    pub wake_lock_enabled: bool,
    pub audio_output: bool,
    pub capture_sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub interval_sec: f64,
    pub max_age_hours: i64,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub rust_log_filter: String,
    pub trace_file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub logs_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: AppMode::Dev,
            content: ContentConfig::default(),
            player: PlayerConfig::default(),
            snapshot: SnapshotConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let crossfade = CrossfadeSettings::default();
        Self {
            crossfade_ms: crossfade.duration_ms,
            crossfade_steps: crossfade.steps,
            frame_rate: DEFAULT_FRAME_RATE,
            wake_lock_enabled: true,
            audio_output: true,
            capture_sample_rate: 44_100,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        let defaults = SnapshotSettings::default();
        Self {
            path: PathBuf::from("data/session-resume.json"),
            interval_sec: defaults.save_interval().as_secs_f64(),
            max_age_hours: defaults.max_age_hours,
            max_bytes: defaults.max_bytes,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            rust_log_filter: DEFAULT_LOG_FILTER.to_string(),
            trace_file_prefix: DEFAULT_LOG_PREFIX.to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Loads `explicit`, or the discovered config file, or the defaults when
    /// no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_path()?,
        };

        match path {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no {CONFIG_FILE_NAME} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config TOML from {}", path.display()))?;
        info!(path = %path.display(), mode = ?config.mode, "config loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        let interval_ms = if self.snapshot.interval_sec.is_finite() && self.snapshot.interval_sec > 0.0
        {
            (self.snapshot.interval_sec * 1_000.0).round() as u64
        } else {
            SnapshotSettings::default().save_interval_ms
        };

        EngineSettings {
            crossfade: CrossfadeSettings {
                duration_ms: self.player.crossfade_ms,
                steps: self.player.crossfade_steps,
            },
            snapshot: SnapshotSettings {
                save_interval_ms: interval_ms,
                max_age_hours: self.snapshot.max_age_hours,
                max_bytes: self.snapshot.max_bytes,
            },
            wake_lock_enabled: self.player.wake_lock_enabled,
        }
    }
}

fn discover_config_path() -> Result<Option<PathBuf>> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(Some(path));
        }
        debug!(path = %path.display(), "{CONFIG_PATH_ENV} does not name a file, ignoring");
    }

    let cwd = env::current_dir().context("failed to resolve current directory")?;
    let candidates = [
        cwd.join(CONFIG_FILE_NAME),
        cwd.join("..").join(CONFIG_FILE_NAME),
    ];
    Ok(candidates.into_iter().find(|path| path.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config = AppConfig::parse(
            r#"
            mode = "prod"

            [player]
            crossfade_ms = 250
            wake_lock_enabled = false
            audio_output = false

            [snapshot]
            interval_sec = 5.0
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.mode, AppMode::Prod);
        assert_eq!(config.player.crossfade_ms, 250);
        assert_eq!(config.player.crossfade_steps, 10);
        assert!(!config.player.audio_output);
        assert_eq!(config.player.capture_sample_rate, 44_100);
        assert_eq!(config.content.root, PathBuf::from("content"));
        assert_eq!(config.snapshot.path, PathBuf::from("data/session-resume.json"));

        let settings = config.engine_settings();
        assert_eq!(settings.crossfade.duration_ms, 250);
        assert_eq!(settings.snapshot.save_interval_ms, 5_000);
        assert_eq!(settings.snapshot.max_age_hours, 24);
        assert!(!settings.wake_lock_enabled);
    }

    #[test]
    fn default_config_matches_engine_defaults() {
        assert_eq!(AppConfig::default().engine_settings(), EngineSettings::default());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[content]\nroot = \"library\"\n").expect("config should write");

        let config = AppConfig::load(Some(&path)).expect("explicit config should load");
        assert_eq!(config.content.root, PathBuf::from("library"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(AppConfig::parse("mode = 3").is_err());
    }
}
