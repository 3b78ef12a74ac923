//! Task records and batch input drafts.
//!
//! A [`Task`] is validated once, when it is built, and is immutable after
//! that. [`TaskDraft`] is the loose shape used for batch input files.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Longest estimate a task may carry.
pub const MAX_ESTIMATE_DAYS: i64 = 365;

/// A unit of work waiting for a time slot.
///
/// Lower `priority` means more urgent. Priorities are unbounded; ties are
/// broken by insertion order in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: i64,
    #[serde(rename = "estimated_secs", with = "duration_secs")]
    pub estimated_duration: Duration,
}

impl Task {
    /// Build a task with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTask`] if the name is blank or the
    /// duration is not positive or exceeds [`MAX_ESTIMATE_DAYS`].
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        estimated_duration: Duration,
    ) -> Result<Self, ValidationError> {
        let task = Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            priority,
            estimated_duration,
        };
        task.validate()?;
        Ok(task)
    }

    /// Same as [`Task::new`] with the estimate given in fractional hours.
    pub fn with_hours(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        hours: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let duration = hours_to_duration(&name, hours)?;
        Self::new(name, description, priority, duration)
    }

    /// Check the invariants a queued task must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::invalid_task(&self.name, "missing identifier"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::invalid_task(&self.name, "name must not be blank"));
        }
        if self.estimated_duration <= Duration::zero() {
            return Err(ValidationError::invalid_task(
                &self.name,
                format!(
                    "estimated duration must be positive (got {} s)",
                    self.estimated_duration.num_seconds()
                ),
            ));
        }
        if self.estimated_duration > Duration::days(MAX_ESTIMATE_DAYS) {
            return Err(ValidationError::invalid_task(
                &self.name,
                format!("estimated duration exceeds {MAX_ESTIMATE_DAYS} days"),
            ));
        }
        Ok(())
    }

    pub fn estimated_minutes(&self) -> i64 {
        self.estimated_duration.num_minutes()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task(Name: {}, Priority: {}, Estimated Time: {})",
            self.name,
            self.priority,
            format_duration(self.estimated_duration)
        )
    }
}

/// Batch input shape for a task, before validation.
///
/// Exactly one of `estimated_hours` / `estimated_minutes` should be set;
/// when both are present the minutes win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,
}

impl TaskDraft {
    pub fn hours(name: &str, description: &str, priority: i64, hours: f64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            priority,
            estimated_hours: Some(hours),
            estimated_minutes: None,
        }
    }

    /// Validate and turn the draft into a [`Task`].
    pub fn into_task(self) -> Result<Task, ValidationError> {
        let duration = match (self.estimated_minutes, self.estimated_hours) {
            (Some(minutes), _) => Duration::try_minutes(minutes).ok_or_else(|| {
                ValidationError::invalid_task(&self.name, "estimated minutes out of range")
            })?,
            (None, Some(hours)) => hours_to_duration(&self.name, hours)?,
            (None, None) => {
                return Err(ValidationError::invalid_task(
                    &self.name,
                    "missing estimated_hours or estimated_minutes",
                ))
            }
        };
        Task::new(self.name, self.description, self.priority, duration)
    }
}

/// Batch file wrapper, used for TOML input (`[[task]]` tables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBatch {
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskDraft>,
}

fn hours_to_duration(name: &str, hours: f64) -> Result<Duration, ValidationError> {
    if !hours.is_finite() {
        return Err(ValidationError::invalid_task(name, "estimated hours must be finite"));
    }
    let secs = (hours * 3600.0).round();
    if secs.abs() > (i64::MAX / 1000) as f64 {
        return Err(ValidationError::invalid_task(name, "estimated hours out of range"));
    }
    Duration::try_seconds(secs as i64)
        .ok_or_else(|| ValidationError::invalid_task(name, "estimated hours out of range"))
}

/// Render a duration as `H:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Serde adapter storing a `chrono::Duration` as whole seconds.
pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs} s")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_gets_unique_id() {
        let a = Task::with_hours("A", "", 1, 1.0).unwrap();
        let b = Task::with_hours("A", "", 1, 1.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fractional_hours_convert_to_minutes() {
        let task = Task::with_hours("Task 2", "Medium priority task", 2, 1.5).unwrap();
        assert_eq!(task.estimated_minutes(), 90);
    }

    #[test]
    fn zero_and_negative_durations_rejected() {
        assert!(matches!(
            Task::new("zero", "", 1, Duration::zero()),
            Err(ValidationError::InvalidTask { .. })
        ));
        assert!(Task::with_hours("neg", "", 1, -2.0).is_err());
        assert!(Task::with_hours("nan", "", 1, f64::NAN).is_err());
    }

    #[test]
    fn oversized_estimates_rejected() {
        let err = Task::with_hours("huge", "", 1, 1e10).unwrap_err();
        assert!(err.to_string().contains("exceeds 365 days"));
        assert!(Task::new("year", "", 1, Duration::days(MAX_ESTIMATE_DAYS)).is_ok());
        assert!(Task::new("longer", "", 1, Duration::days(MAX_ESTIMATE_DAYS + 1)).is_err());

        let draft = TaskDraft {
            name: "minutes".into(),
            estimated_minutes: Some(i64::MAX / 120),
            ..Default::default()
        };
        assert!(draft.into_task().is_err());
    }

    #[test]
    fn blank_name_rejected() {
        let err = Task::new("   ", "", 1, Duration::minutes(5)).unwrap_err();
        assert!(err.to_string().contains("name must not be blank"));
    }

    #[test]
    fn display_matches_status_line() {
        let task = Task::with_hours("Task 1", "High priority task", 1, 2.0).unwrap();
        assert_eq!(
            task.to_string(),
            "Task(Name: Task 1, Priority: 1, Estimated Time: 2:00:00)"
        );
    }

    #[test]
    fn draft_prefers_minutes_over_hours() {
        let draft = TaskDraft {
            name: "x".into(),
            priority: 0,
            estimated_hours: Some(5.0),
            estimated_minutes: Some(30),
            ..Default::default()
        };
        assert_eq!(draft.into_task().unwrap().estimated_minutes(), 30);
    }

    #[test]
    fn draft_without_estimate_rejected() {
        let draft = TaskDraft {
            name: "x".into(),
            ..Default::default()
        };
        assert!(draft.into_task().is_err());
    }

    #[test]
    fn task_serializes_duration_as_seconds() {
        let task = Task::new("A", "desc", 3, Duration::minutes(2)).unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["estimated_secs"], 120);
        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn toml_batch_parses_task_tables() {
        let batch: TaskBatch = toml::from_str(
            r#"
            [[task]]
            name = "Task 1"
            priority = 1
            estimated_hours = 2.0

            [[task]]
            name = "Task 2"
            description = "Medium"
            priority = 2
            estimated_minutes = 90
            "#,
        )
        .unwrap();
        assert_eq!(batch.tasks.len(), 2);
        assert_eq!(batch.tasks[1].estimated_minutes, Some(90));
    }
}
