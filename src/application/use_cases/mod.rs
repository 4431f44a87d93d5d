//! Use case implementations.

mod broadcast_use_case;
mod refill_use_case;

pub use broadcast_use_case::BroadcastUseCase;
pub use refill_use_case::{DEFAULT_REFILL_BATCH, RefillUseCase};
