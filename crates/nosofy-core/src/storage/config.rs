//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer preset durations
//! - Daily and weekly score goals
//! - Streak lookback bound
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::stats::{Goals, DEFAULT_MAX_LOOKBACK_DAYS};
use crate::timer::TimerPreset;

/// Countdown preset durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_daily_score")]
    pub daily_score: u32,
    #[serde(default = "default_weekly_average")]
    pub weekly_average: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub streak: StreakConfig,
}

// Default functions
fn default_work_minutes() -> u32 {
    TimerPreset::Work.default_minutes()
}
fn default_short_break_minutes() -> u32 {
    TimerPreset::ShortBreak.default_minutes()
}
fn default_long_break_minutes() -> u32 {
    TimerPreset::LongBreak.default_minutes()
}
fn default_daily_score() -> u32 {
    100
}
fn default_weekly_average() -> u32 {
    70
}
fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_score: default_daily_score(),
            weekly_average: default_weekly_average(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            max_lookback_days: default_max_lookback_days(),
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
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let number = value.parse::<u32>().map_err(|_| {
                            invalid(format!("cannot parse '{value}' as a whole number"))
                        })?;
                        serde_json::Value::Number(number.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
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

    fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing and returning the default if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
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
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. `self` is left unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
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

    /// Set a value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Goals and durations must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("timer.work_minutes", self.timer.work_minutes),
            ("timer.short_break_minutes", self.timer.short_break_minutes),
            ("timer.long_break_minutes", self.timer.long_break_minutes),
            ("goals.daily_score", self.goals.daily_score),
            ("goals.weekly_average", self.goals.weekly_average),
            ("streak.max_lookback_days", self.streak.max_lookback_days),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configured length of `preset`. A zero from a hand-edited file falls
    /// back to the preset default.
    pub fn minutes_for(&self, preset: TimerPreset) -> u32 {
        let minutes = match preset {
            TimerPreset::Work => self.timer.work_minutes,
            TimerPreset::ShortBreak => self.timer.short_break_minutes,
            TimerPreset::LongBreak => self.timer.long_break_minutes,
        };
        if minutes == 0 {
            preset.default_minutes()
        } else {
            minutes
        }
    }

    pub fn goals(&self) -> Goals {
        Goals {
            daily_score: f64::from(self.goals.daily_score),
            weekly_average: f64::from(self.goals.weekly_average),
        }
    }
}
