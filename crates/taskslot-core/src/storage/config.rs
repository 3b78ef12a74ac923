//! TOML-based application configuration.
//!
//! Stores:
//! - which availability provider a pass uses and how it is tuned
//! - working hours for the calendar provider
//!
//! Configuration is stored at `~/.config/taskslot/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::provider::WorkingHours;
use crate::scheduler::SchedulerConfig;

/// Which built-in provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Back-to-back slots, commit-aware.
    Sequential,
    /// Reference stub, stateless.
    FixedOffset,
    /// Free gaps between busy calendar events.
    Calendar,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sequential" => Ok(Self::Sequential),
            "fixed_offset" | "fixed" => Ok(Self::FixedOffset),
            "calendar" => Ok(Self::Calendar),
            other => Err(ConfigError::InvalidValue {
                key: "scheduler.provider".into(),
                message: format!("unknown provider '{other}'"),
            }),
        }
    }
}

/// Scheduler-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Minutes between "now" and the first offered slot.
    #[serde(default = "default_offset_minutes")]
    pub offset_minutes: u32,
    /// Free minutes left between consecutive sequential slots.
    #[serde(default)]
    pub gap_minutes: u32,
    /// Bound for one provider lookup; 0 disables it.
    #[serde(default = "default_timeout_ms")]
    pub provider_timeout_ms: u64,
}

/// Calendar provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSection {
    #[serde(default = "default_work_start")]
    pub work_start: String, // HH:MM
    #[serde(default = "default_work_end")]
    pub work_end: String, // HH:MM
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// JSON file with busy events, used when `--busy` is not given.
    #[serde(default)]
    pub busy_file: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskslot/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub calendar: CalendarSection,
}

// Default functions
fn default_provider() -> ProviderKind {
    ProviderKind::Sequential
}
fn default_offset_minutes() -> u32 {
    10
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_work_start() -> String {
    "09:00".into()
}
fn default_work_end() -> String {
    "18:00".into()
}
fn default_horizon_days() -> u32 {
    7
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            offset_minutes: default_offset_minutes(),
            gap_minutes: 0,
            provider_timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            horizon_days: default_horizon_days(),
            busy_file: None,
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

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            // Unset optional values accept any string.
            serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let to_json = |e: serde_json::Error| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut json = serde_json::to_value(&*self).map_err(to_json)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(to_json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.working_hours().map_err(|e| match e {
            ValidationError::InvalidValue { field, message } => ConfigError::InvalidValue {
                key: format!("calendar.{field}"),
                message,
            },
            other => ConfigError::ParseFailed(other.to_string()),
        })?;
        Ok(())
    }

    pub fn working_hours(&self) -> Result<WorkingHours, ValidationError> {
        WorkingHours::parse(&self.calendar.work_start, &self.calendar.work_end)
    }

    pub fn offset(&self) -> Duration {
        Duration::minutes(i64::from(self.scheduler.offset_minutes))
    }

    pub fn gap(&self) -> Duration {
        Duration::minutes(i64::from(self.scheduler.gap_minutes))
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let timeout = self.scheduler.provider_timeout_ms;
        SchedulerConfig {
            provider_timeout: (timeout > 0).then(|| std::time::Duration::from_millis(timeout)),
        }
    }
}
