//! Application layer with services, use cases and the scheduler.

/// Outcome reports.
pub mod dto;
/// Refill/broadcast lifecycle.
pub mod scheduler;
/// Stateful services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{RefillReport, RegistrationStatus, RetractionOutcome, TickReport};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError};
pub use services::{FeedbackTracker, PrefetchCache, TargetRegistry};
pub use use_cases::{BroadcastUseCase, RefillUseCase};
