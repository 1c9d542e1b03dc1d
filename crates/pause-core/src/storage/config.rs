//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session duration presets and the default duration
//! - Timer tick interval
//! - Streak reset window
//! - Activity window length
//! - Affirmation language and data directory
//!
//! Configuration is stored at `~/.config/pause/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::stats::MAX_WINDOW_DAYS;
use crate::timer::DEFAULT_DURATIONS;

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,
    #[serde(default = "default_durations")]
    pub durations: Vec<u64>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Streak configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Gap after which the streak reads back as 0.
    #[serde(default = "default_reset_after_hours")]
    pub reset_after_hours: u64,
}

/// Activity heatmap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// Affirmation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffirmationsConfig {
    /// Language code; empty means detect from the environment locale.
    #[serde(default)]
    pub language: String,
    /// Directory of `<code>.json` files overriding the bundled lists.
    #[serde(default)]
    pub dir: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pause/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub affirmations: AffirmationsConfig,
}

fn default_duration_secs() -> u64 {
    60
}
fn default_durations() -> Vec<u64> {
    DEFAULT_DURATIONS.to_vec()
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_reset_after_hours() -> u64 {
    24
}
fn default_window_days() -> u32 {
    7
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: default_duration_secs(),
            durations: default_durations(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            reset_after_hours: default_reset_after_hours(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result breaks a config invariant.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.timer.durations.is_empty() || self.timer.durations.contains(&0) {
            return Err(invalid(
                "timer.durations",
                "must list at least one positive duration",
            ));
        }
        if !self.timer.durations.contains(&self.timer.default_duration_secs) {
            return Err(invalid(
                "timer.default_duration_secs",
                "must be one of timer.durations",
            ));
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(invalid("timer.tick_interval_ms", "must be positive"));
        }
        if self.streak.reset_after_hours == 0 {
            return Err(invalid("streak.reset_after_hours", "must be positive"));
        }
        if self.activity.window_days == 0 || self.activity.window_days > MAX_WINDOW_DAYS {
            return Err(invalid(
                "activity.window_days",
                &format!("must be between 1 and {MAX_WINDOW_DAYS}"),
            ));
        }
        Ok(())
    }

    pub fn streak_window_ms(&self) -> u64 {
        self.streak.reset_after_hours.saturating_mul(60 * 60 * 1000)
    }

    pub fn affirmation_dir(&self) -> Option<PathBuf> {
        if self.affirmations.dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.affirmations.dir))
        }
    }
}
