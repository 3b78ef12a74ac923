//! Mutex-serialized submission handle.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{QueueKey, TaskQueue};
use crate::error::ValidationError;
use crate::task::Task;

/// Cloneable handle for submitting tasks from several callers.
///
/// Insertion is serialized behind a mutex. A scheduling pass takes the
/// pending set out with [`take_pending`](Self::take_pending) and works on it
/// without the lock held.
#[derive(Debug, Clone, Default)]
pub struct SharedTaskQueue {
    inner: Arc<Mutex<TaskQueue>>,
}

impl SharedTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation under the lock is a single map operation, so a
    // poisoned queue is still consistent.
    fn lock(&self) -> MutexGuard<'_, TaskQueue> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn submit(&self, task: Task) -> Result<QueueKey, ValidationError> {
        self.lock().insert(task)
    }

    /// Submit several tasks under one lock acquisition.
    ///
    /// Each task gets its own result; a rejected task does not stop the rest.
    pub fn submit_all<I>(&self, tasks: I) -> Vec<Result<QueueKey, ValidationError>>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut queue = self.lock();
        tasks.into_iter().map(|task| queue.insert(task)).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of pending task names in extraction order.
    pub fn pending_names(&self) -> Vec<String> {
        self.lock().iter().map(|t| t.name.clone()).collect()
    }

    pub(crate) fn take_pending(&self) -> TaskQueue {
        self.lock().take_pending()
    }

    pub(crate) fn restore(&self, remaining: TaskQueue) {
        self.lock().restore(remaining);
    }
}
