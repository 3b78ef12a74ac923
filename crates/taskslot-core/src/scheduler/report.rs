//! Pass results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

use crate::provider::Slot;
use crate::task::Task;

/// A task placed into a time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAssignment {
    pub task_id: String,
    pub task_name: String,
    pub priority: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduledAssignment {
    /// Assignment for `task` starting at the beginning of `slot`.
    ///
    /// The end is always `start + estimated duration`, whatever the length
    /// of the slot the provider offered. `None` if that end is not
    /// representable.
    pub fn new(task: &Task, slot: &Slot) -> Option<Self> {
        Some(Self {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            priority: task.priority,
            start_time: slot.start,
            end_time: slot.start.checked_add_signed(task.estimated_duration)?,
        })
    }

    pub fn slot(&self) -> Slot {
        Slot {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Why a task was not scheduled in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferralReason {
    /// The provider had nothing long enough, or did not answer in time.
    NoSlot,
    /// The provider faulted while handling this task, or the pass was
    /// aborted before reaching it.
    ProviderFault,
}

impl DeferralReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferralReason::NoSlot => "no_slot",
            DeferralReason::ProviderFault => "provider_fault",
        }
    }
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task handed back to the caller instead of being scheduled.
///
/// Deferred tasks are not retried within the pass; resubmitting is up to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deferral {
    pub task_id: String,
    pub task_name: String,
    pub priority: i64,
    pub reason: DeferralReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Deferral {
    pub fn new(task: &Task, reason: DeferralReason, detail: Option<String>) -> Self {
        Self {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            priority: task.priority,
            reason,
            detail,
        }
    }
}

/// Outcome of one drain of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// In extraction order.
    pub assignments: Vec<ScheduledAssignment>,
    /// In extraction order.
    pub deferred: Vec<Deferral>,
    /// Tasks an aborted pass never reached. They are back in the queue.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unattempted: Vec<Deferral>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PassReport {
    pub(crate) fn begin() -> Self {
        let now = Utc::now();
        Self {
            assignments: Vec::new(),
            deferred: Vec::new(),
            unattempted: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// True when the queue had nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.deferred.is_empty() && self.unattempted.is_empty()
    }

    pub fn scheduled_count(&self) -> usize {
        self.assignments.len()
    }

    /// Deferred plus unattempted tasks.
    pub fn deferred_count(&self) -> usize {
        self.deferred.len() + self.unattempted.len()
    }

    pub fn deferred_with(&self, reason: DeferralReason) -> impl Iterator<Item = &Deferral> {
        self.deferred.iter().filter(move |d| d.reason == reason)
    }

    /// Index pairs of assignments whose windows overlap.
    ///
    /// Always empty with a commit-aware provider; a stateless provider may
    /// produce some.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.assignments.iter().enumerate() {
            for (j, b) in self.assignments.iter().enumerate().skip(i + 1) {
                if a.slot().overlaps(&b.slot()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Human-readable summary, one line per task.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            out.push_str("No tasks to schedule.\n");
            return out;
        }
        for a in &self.assignments {
            let _ = writeln!(
                out,
                "Task '{}' scheduled from {} to {}.",
                a.task_name,
                a.start_time.format("%Y-%m-%d %H:%M:%S"),
                a.end_time.format("%Y-%m-%d %H:%M:%S"),
            );
        }
        for d in &self.deferred {
            match &d.detail {
                Some(detail) => {
                    let _ = writeln!(
                        out,
                        "Task '{}' deferred ({}): {}. Need to reschedule.",
                        d.task_name, d.reason, detail
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "Task '{}' deferred ({}). Need to reschedule.",
                        d.task_name, d.reason
                    );
                }
            }
        }
        for d in &self.unattempted {
            let _ = writeln!(
                out,
                "Task '{}' not attempted ({}). Left in the queue.",
                d.task_name, d.reason
            );
        }
        let overlaps = self.overlapping_pairs().len();
        if overlaps > 0 {
            let _ = writeln!(out, "warning: {overlaps} overlapping assignment pair(s)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    #[test]
    fn assignment_end_uses_task_duration_not_slot_length() {
        let task = Task::new("A", "", 1, Duration::hours(2)).unwrap();
        let slot = Slot::new(t0(), t0() + Duration::hours(8)).unwrap();
        let a = ScheduledAssignment::new(&task, &slot).unwrap();
        assert_eq!(a.end_time, t0() + Duration::hours(2));
        assert_eq!(a.duration_minutes(), 120);
    }

    #[test]
    fn assignment_past_the_end_of_time_is_refused() {
        let task = Task::new("A", "", 1, Duration::hours(2)).unwrap();
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let slot = Slot::new(late, DateTime::<Utc>::MAX_UTC).unwrap();
        assert!(ScheduledAssignment::new(&task, &slot).is_none());
    }

    #[test]
    fn reason_codes_serialize_snake_case() {
        let json = serde_json::to_string(&DeferralReason::ProviderFault).unwrap();
        assert_eq!(json, "\"provider_fault\"");
        assert_eq!(DeferralReason::NoSlot.to_string(), "no_slot");
    }

    #[test]
    fn empty_report_renders_nothing_to_schedule() {
        let report = PassReport::begin();
        assert!(report.is_empty());
        assert_eq!(report.render_text(), "No tasks to schedule.\n");
    }

    #[test]
    fn overlaps_are_detected_and_reported() {
        let mut report = PassReport::begin();
        for name in ["A", "B"] {
            let task = Task::new(name, "", 1, Duration::hours(1)).unwrap();
            let slot = Slot::starting_at(t0(), Duration::hours(1)).unwrap();
            report
                .assignments
                .extend(ScheduledAssignment::new(&task, &slot));
        }
        assert_eq!(report.overlapping_pairs(), vec![(0, 1)]);
        assert!(report.render_text().contains("1 overlapping"));
    }

    #[test]
    fn render_lists_deferrals_with_reason() {
        let mut report = PassReport::begin();
        let task = Task::new("Late", "", 4, Duration::hours(1)).unwrap();
        report
            .deferred
            .push(Deferral::new(&task, DeferralReason::NoSlot, None));
        assert_eq!(
            report.render_text(),
            "Task 'Late' deferred (no_slot). Need to reschedule.\n"
        );
        assert_eq!(report.deferred_with(DeferralReason::NoSlot).count(), 1);
    }

    #[test]
    fn unattempted_tasks_are_listed_and_counted() {
        let mut report = PassReport::begin();
        let task = Task::new("Later", "", 5, Duration::hours(1)).unwrap();
        report.unattempted.push(Deferral::new(
            &task,
            DeferralReason::ProviderFault,
            Some("not attempted".into()),
        ));
        assert!(!report.is_empty());
        assert_eq!(report.deferred_count(), 1);
        assert_eq!(
            report.render_text(),
            "Task 'Later' not attempted (provider_fault). Left in the queue.\n"
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unattempted"][0]["task_name"], "Later");
        assert!(serde_json::to_value(PassReport::begin()).unwrap()["unattempted"].is_null());
    }
}
