//! # taskslot Core Library
//!
//! Priority-ordered task scheduling against an external source of free time.
//! All logic lives here; the `taskslot` CLI is a thin front end over it.
//!
//! ## Architecture
//!
//! - **Queue**: pending tasks ordered by priority, FIFO among equals
//! - **Providers**: anything that can answer "next free slot of this length"
//! - **Scheduler**: drains the queue once per pass, assigning or deferring
//!   each task
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TaskQueue`]: the priority queue
//! - [`AvailabilityProvider`]: the provider boundary
//! - [`Scheduler`]: pass orchestration, producing a [`PassReport`]
//! - [`Config`]: application configuration management

pub mod error;
pub mod provider;
pub mod queue;
pub mod scheduler;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, PassError, ProviderError, ValidationError};
pub use provider::{
    AvailabilityProvider, CalendarEvent, CalendarProvider, FixedOffsetProvider,
    SequentialProvider, Slot, WorkingHours,
};
pub use queue::{compare_keys, QueueKey, SharedTaskQueue, TaskQueue};
pub use scheduler::{
    Deferral, DeferralReason, PassReport, ScheduledAssignment, Scheduler, SchedulerConfig,
};
pub use storage::{Config, ProviderKind};
pub use task::{Task, TaskBatch, TaskDraft};
