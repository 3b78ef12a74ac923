//! Slot assignment for queued tasks.
//!
//! A pass drains the queue in priority order and asks the provider for a
//! slot for each task:
//! - slot found: the task is scheduled and the slot committed back to the
//!   provider
//! - no slot, or no answer within the lookup bound: the task is deferred as
//!   `no_slot` and handed back to the caller
//! - provider fault: the current task is deferred, the rest of the queue is
//!   listed as unattempted and left pending, and the pass fails with the
//!   partial report

mod report;
mod worker;

pub use report::{Deferral, DeferralReason, PassReport, ScheduledAssignment};

use std::time::Duration as StdDuration;

use crate::error::{PassError, ProviderError, ValidationError};
use crate::provider::AvailabilityProvider;
use crate::queue::{QueueKey, SharedTaskQueue, TaskQueue};
use crate::task::{Task, TaskDraft};
use worker::ProviderWorker;

/// Scheduler configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Upper bound for a single provider lookup. The pass stops waiting once
    /// it passes and defers the task as [`DeferralReason::NoSlot`].
    pub provider_timeout: Option<StdDuration>,
}

/// Owns the pending queue and the provider used to place tasks.
///
/// The provider runs on its own thread, which is why it must be `Send`.
pub struct Scheduler {
    queue: SharedTaskQueue,
    provider: ProviderWorker,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler with default config
    pub fn new<P>(provider: P) -> Self
    where
        P: AvailabilityProvider + Send + 'static,
    {
        Self::with_config(provider, SchedulerConfig::default())
    }

    /// Create with custom config
    pub fn with_config<P>(provider: P, config: SchedulerConfig) -> Self
    where
        P: AvailabilityProvider + Send + 'static,
    {
        Self {
            queue: SharedTaskQueue::new(),
            provider: ProviderWorker::spawn(provider),
            config,
        }
    }

    /// Handle other callers can use to submit tasks.
    pub fn submitter(&self) -> SharedTaskQueue {
        self.queue.clone()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a task for the next pass.
    pub fn submit(&self, task: Task) -> Result<QueueKey, ValidationError> {
        match self.queue.submit(task) {
            Ok(key) => {
                tracing::debug!(priority = key.priority, sequence = key.sequence, "task queued");
                Ok(key)
            }
            Err(e) => {
                tracing::warn!("rejected task: {e}");
                Err(e)
            }
        }
    }

    /// Validate and queue a batch of drafts.
    ///
    /// Results line up with the input; a bad draft never blocks the others.
    pub fn submit_batch<I>(&self, drafts: I) -> Vec<Result<QueueKey, ValidationError>>
    where
        I: IntoIterator<Item = TaskDraft>,
    {
        drafts
            .into_iter()
            .map(|draft| draft.into_task().and_then(|task| self.submit(task)))
            .collect()
    }

    /// Drain the queue once.
    ///
    /// Tasks submitted while the pass runs wait for the next one.
    ///
    /// # Errors
    ///
    /// [`PassError::ProviderUnavailable`] when the provider faults. Tasks not
    /// yet attempted are listed in the partial report's `unattempted` and go
    /// back to the queue in their original order.
    pub fn run_pass(&mut self) -> Result<PassReport, PassError> {
        let mut batch = self.queue.take_pending();
        let mut report = PassReport::begin();

        if batch.is_empty() {
            tracing::info!("no tasks to schedule");
            report.finish();
            return Ok(report);
        }

        tracing::info!(
            provider = self.provider.name(),
            tasks = batch.len(),
            "scheduling pass started"
        );

        while let Some(task) = batch.extract_min() {
            match self.place(&task) {
                Ok(Some(assignment)) => {
                    self.provider.commit(assignment.slot());
                    tracing::debug!(
                        task = %task.name,
                        start = %assignment.start_time,
                        end = %assignment.end_time,
                        "task scheduled"
                    );
                    report.assignments.push(assignment);
                }
                Ok(None) => {
                    tracing::warn!(task = %task.name, "no available slot, deferring");
                    report
                        .deferred
                        .push(Deferral::new(&task, DeferralReason::NoSlot, None));
                }
                Err(e) if !e.is_fatal() => {
                    tracing::warn!(task = %task.name, "slot lookup gave no answer, deferring: {e}");
                    report.deferred.push(Deferral::new(
                        &task,
                        DeferralReason::NoSlot,
                        Some(e.to_string()),
                    ));
                }
                Err(e) => {
                    tracing::error!(
                        task = %task.name,
                        remaining = batch.len(),
                        "provider fault, aborting pass: {e}"
                    );
                    report.deferred.push(Deferral::new(
                        &task,
                        DeferralReason::ProviderFault,
                        Some(e.to_string()),
                    ));
                    report.unattempted = batch
                        .iter()
                        .map(|t| {
                            Deferral::new(
                                t,
                                DeferralReason::ProviderFault,
                                Some("not attempted, pass aborted".to_string()),
                            )
                        })
                        .collect();
                    report.finish();
                    self.return_unattempted(batch);
                    return Err(PassError::ProviderUnavailable {
                        provider: self.provider.name().to_string(),
                        source: e,
                        partial: Box::new(report),
                    });
                }
            }
        }

        report.finish();
        tracing::info!(
            scheduled = report.scheduled_count(),
            deferred = report.deferred_count(),
            "scheduling pass finished"
        );
        Ok(report)
    }

    /// One bounded provider call, checked and turned into an assignment.
    fn place(&mut self, task: &Task) -> Result<Option<ScheduledAssignment>, ProviderError> {
        let found = self
            .provider
            .find_slot(task.estimated_duration, self.config.provider_timeout)?;
        let Some(slot) = found else {
            return Ok(None);
        };
        if !slot.can_fit(task.estimated_duration) {
            return Err(ProviderError::InvalidResponse(format!(
                "slot of {} min is shorter than the requested {} min",
                slot.duration().num_minutes(),
                task.estimated_minutes()
            )));
        }
        ScheduledAssignment::new(task, &slot).map(Some).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "slot starting {} cannot hold {} min",
                slot.start,
                task.estimated_minutes()
            ))
        })
    }

    fn return_unattempted(&self, remaining: TaskQueue) {
        if !remaining.is_empty() {
            tracing::info!(count = remaining.len(), "returning unattempted tasks to the queue");
            self.queue.restore(remaining);
        }
    }
}
