//! Stateful application services.

mod feedback_tracker;
mod prefetch_cache;
mod target_registry;

pub use feedback_tracker::{
    DEFAULT_REJECT_THRESHOLD, DEFAULT_RETRACTION_NOTICE, DEFAULT_TRACKED_MESSAGES,
    FeedbackTracker,
};
pub use prefetch_cache::{CacheStats, DEFAULT_CACHE_SIZE, PrefetchCache};
pub use target_registry::TargetRegistry;
