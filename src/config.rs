//! User-tunable settings
//!
//! `Config` is what the user edits at runtime and is persisted in the
//! key-value store under `postureConfig`. `Settings` is an optional TOML file
//! the host can ship to change defaults, timezone and data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::CONFIG_KEY;
use crate::error::{PostureError, PostureResult};
use crate::stats::{FileStore, KvStore};
use crate::utils::Timezone;

pub const MIN_GOOD_ANGLE: f64 = 5.0;
pub const MAX_GOOD_ANGLE: f64 = 40.0;
pub const MIN_ALERT_INTERVAL_MS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingSpeed {
    /// Every frame the detector produces
    Fast,
    #[default]
    Medium,
    Slow,
}

impl ProcessingSpeed {
    /// Fixed tick interval, or None when ticks follow frame delivery
    pub fn tick_interval(self) -> Option<Duration> {
        match self {
            ProcessingSpeed::Fast => None,
            ProcessingSpeed::Medium => Some(Duration::from_millis(200)),
            ProcessingSpeed::Slow => Some(Duration::from_millis(500)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(rename = "maxGoodAngle", default = "default_max_good_angle")]
    pub max_good_angle_degrees: f64,
    #[serde(rename = "alertInterval", default = "default_alert_interval")]
    pub alert_interval_ms: i64,
    #[serde(default)]
    pub processing_speed: ProcessingSpeed,
}

fn default_max_good_angle() -> f64 {
    25.0
}

fn default_alert_interval() -> i64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_good_angle_degrees: default_max_good_angle(),
            alert_interval_ms: default_alert_interval(),
            processing_speed: ProcessingSpeed::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> PostureResult<()> {
        if !(MIN_GOOD_ANGLE..=MAX_GOOD_ANGLE).contains(&self.max_good_angle_degrees) {
            return Err(PostureError::InvalidConfig(format!(
                "posture threshold must be between {MIN_GOOD_ANGLE} and {MAX_GOOD_ANGLE} degrees, got {}",
                self.max_good_angle_degrees
            )));
        }
        if self.alert_interval_ms < MIN_ALERT_INTERVAL_MS {
            return Err(PostureError::InvalidConfig(format!(
                "alert interval must be at least {MIN_ALERT_INTERVAL_MS}ms, got {}",
                self.alert_interval_ms
            )));
        }
        Ok(())
    }
}

/// Stored config, or `fallback` when missing, unreadable or out of range
pub fn load_config<S: KvStore>(store: &S, fallback: Config) -> Config {
    let raw = match store.get(CONFIG_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return fallback,
        Err(e) => {
            tracing::warn!(error = %e, "using default config");
            return fallback;
        }
    };
    let parsed = serde_json::from_str::<Config>(&raw).map_err(|e| PostureError::StorageRead {
        key: CONFIG_KEY.to_string(),
        reason: e.to_string(),
    });
    match parsed.and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "using default config");
            fallback
        }
    }
}

/// Validate and persist; storage failures are logged, invalid values rejected
pub fn save_config<S: KvStore>(store: &mut S, config: &Config) -> PostureResult<()> {
    config.validate()?;
    match serde_json::to_string(config) {
        Ok(json) => {
            if let Err(e) = store.set(CONFIG_KEY, &json) {
                tracing::warn!(error = %e, "config kept in memory only");
            }
        }
        Err(e) => tracing::warn!(error = %e, "config kept in memory only"),
    }
    Ok(())
}

/// Forget the stored config; returns `fallback`
pub fn reset_config<S: KvStore>(store: &mut S, fallback: Config) -> Config {
    if let Err(e) = store.remove(CONFIG_KEY) {
        tracing::warn!(error = %e, "failed to clear stored config");
    }
    fallback
}

/// Host-level settings file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub max_good_angle: Option<f64>,
    #[serde(default)]
    pub alert_interval_ms: Option<i64>,
    #[serde(default)]
    pub processing_speed: Option<ProcessingSpeed>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub alerts_enabled: Option<bool>,
}

impl Settings {
    /// First settings file that exists and parses, else defaults
    pub fn discover() -> Self {
        for path in Self::get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_file(&path) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "loaded settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
                }
            }
        }
        Self::default()
    }

    pub fn load_file(path: &Path) -> PostureResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| PostureError::InvalidConfig(e.to_string()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> PostureResult<Self> {
        toml::from_str(content).map_err(|e| PostureError::InvalidConfig(e.to_string()))
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/posturewatch/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("posturewatch").join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS, AppData on Windows)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("posturewatch").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.posturewatch.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".posturewatch.toml"));
        }

        paths
    }

    /// Built-in defaults overridden by whatever the file sets
    pub fn defaults(&self) -> Config {
        let base = Config::default();
        let candidate = Config {
            max_good_angle_degrees: self.max_good_angle.unwrap_or(base.max_good_angle_degrees),
            alert_interval_ms: self.alert_interval_ms.unwrap_or(base.alert_interval_ms),
            processing_speed: self.processing_speed.unwrap_or(base.processing_speed),
        };
        match candidate.validate() {
            Ok(()) => candidate,
            Err(e) => {
                tracing::warn!(error = %e, "settings out of range, using built-in defaults");
                base
            }
        }
    }

    pub fn timezone(&self) -> PostureResult<Timezone> {
        Timezone::parse(self.timezone.as_deref())
    }

    /// Where statistics and config live: the file's `data_dir` or the platform default
    pub fn store(&self) -> Option<FileStore> {
        let dir = self.data_dir.clone().or_else(FileStore::default_dir)?;
        Some(FileStore::new(dir))
    }
}
