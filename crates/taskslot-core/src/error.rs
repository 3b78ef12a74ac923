//! Core error types for taskslot-core.
//!
//! Every failure the engine can report has its own variant so callers can
//! tell "bad input" apart from "provider fault". An empty queue and a busy
//! calendar are not errors at all; they show up in the pass report.

use std::path::PathBuf;
use thiserror::Error;

use crate::scheduler::PassReport;

/// Core error type for taskslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A scheduling pass was aborted
    #[error("Scheduling pass failed: {0}")]
    Pass(#[from] PassError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML input that does not parse
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CoreError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Read {
            path: path.into(),
            source,
        }
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Malformed task, rejected at insertion
    #[error("Invalid task '{name}': {reason}")]
    InvalidTask { name: String, reason: String },

    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid_task(name: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidTask {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Faults raised by an availability provider.
///
/// A merely busy calendar is `Ok(None)` from the provider, never one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Backend could not be reached or refused the request
    #[error("availability backend unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its time bound
    #[error("availability lookup timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    /// The provider returned something the scheduler cannot use
    #[error("invalid availability response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn timed_out(after: std::time::Duration) -> Self {
        ProviderError::TimedOut {
            after_ms: after.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    /// Whether this fault must abort the pass.
    ///
    /// Timeouts defer the current task as `no_slot` and the pass carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProviderError::TimedOut { .. })
    }
}

/// Errors that end a scheduling pass early.
#[derive(Error, Debug)]
pub enum PassError {
    /// The provider faulted; the pass stopped at the task that hit the fault.
    ///
    /// `partial` holds the assignments and deferrals made before the abort,
    /// including the `provider_fault` deferral of the current task, and
    /// lists the tasks never attempted under `unattempted`.
    #[error("provider '{provider}' unavailable: {source}")]
    ProviderUnavailable {
        provider: String,
        #[source]
        source: ProviderError,
        partial: Box<PassReport>,
    },
}

impl PassError {
    /// Work completed before the pass was aborted.
    pub fn partial_report(&self) -> &PassReport {
        match self {
            PassError::ProviderUnavailable { partial, .. } => partial,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
