use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::session::SessionOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Subtitle source settings
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle source configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// SRT file read when no subtitle path is given on the command line
    #[serde(default = "default_subtitle_path")]
    pub path: String,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            path: default_subtitle_path(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Interval between position ticks in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Start playing as soon as the audio is ready
    #[serde(default = "default_true")]
    pub autoplay: bool,

    /// Playback rate multiplier
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Wait for real time between ticks.
    /// When false the preview runs as fast as possible.
    #[serde(default = "default_true")]
    pub realtime: bool,

    /// Seconds of audio assumed after the last cue when the length is unknown
    #[serde(default = "default_tail_padding_secs")]
    pub tail_padding_secs: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            autoplay: true,
            speed: default_speed(),
            realtime: true,
            tail_padding_secs: default_tail_padding_secs(),
        }
    }
}

impl PlaybackConfig {
    /// Wall-clock time between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            autoplay: self.autoplay,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_subtitle_path() -> String {
    "subtitle.srt".to_string()
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_speed() -> f64 {
    1.0
}

fn default_tail_padding_secs() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.subtitle.path.trim().is_empty() {
            return Err(anyhow!("Subtitle path must not be empty"));
        }

        if self.playback.tick_interval_ms == 0 {
            return Err(anyhow!("Tick interval must be at least 1 ms"));
        }

        if !self.playback.speed.is_finite() || self.playback.speed <= 0.0 {
            return Err(anyhow!("Playback speed must be a positive number, got {}", self.playback.speed));
        }

        if !self.playback.tail_padding_secs.is_finite() || self.playback.tail_padding_secs < 0.0 {
            return Err(anyhow!(
                "Tail padding must be zero or more seconds, got {}",
                self.playback.tail_padding_secs
            ));
        }

        Ok(())
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load a configuration file, writing the defaults there first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            subtitle: SubtitleConfig::default(),
            playback: PlaybackConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
