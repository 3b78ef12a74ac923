//! Priority-ordered task queue.
//!
//! Tasks are keyed by `(priority, sequence)` where `sequence` is handed out
//! in insertion order, so equal priorities come back FIFO. The ordering lives
//! in [`compare_keys`] rather than on `Task` itself.

mod shared;

pub use shared::SharedTaskQueue;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::task::Task;

/// Position of a task in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueKey {
    pub priority: i64,
    pub sequence: u64,
}

/// Queue ordering: lower priority value first, then earlier insertion.
pub fn compare_keys(a: &QueueKey, b: &QueueKey) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(self, other)
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending tasks ordered by [`compare_keys`].
///
/// Not synchronized; wrap it in [`SharedTaskQueue`] when several callers
/// submit work.
#[derive(Debug, Default)]
pub struct TaskQueue {
    entries: BTreeMap<QueueKey, Task>,
    next_sequence: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. O(log n).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTask`] for a malformed task; the
    /// queue is left untouched.
    pub fn insert(&mut self, task: Task) -> Result<QueueKey, ValidationError> {
        task.validate()?;
        let key = QueueKey {
            priority: task.priority,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(key, task);
        Ok(key)
    }

    /// Remove and return the most urgent task, or `None` once drained.
    pub fn extract_min(&mut self) -> Option<Task> {
        self.entries.pop_first().map(|(_, task)| task)
    }

    pub fn peek_min(&self) -> Option<&Task> {
        self.entries.first_key_value().map(|(_, task)| task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending tasks in extraction order, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.entries.values()
    }

    /// Move every pending task into a new queue, keys preserved.
    ///
    /// The sequence counter stays here so later inserts still sort after
    /// the moved tasks.
    pub fn take_pending(&mut self) -> TaskQueue {
        TaskQueue {
            entries: std::mem::take(&mut self.entries),
            next_sequence: self.next_sequence,
        }
    }

    /// Put back tasks previously taken with [`take_pending`](Self::take_pending).
    pub fn restore(&mut self, other: TaskQueue) {
        self.next_sequence = self.next_sequence.max(other.next_sequence);
        self.entries.extend(other.entries);
    }
}
