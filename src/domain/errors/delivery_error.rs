//! Per-target delivery errors.

use thiserror::Error;

/// Failure delivering to, or acting on, a single target.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum DeliveryError {
    #[error("missing permission in target: {message}")]
    Forbidden { message: String },

    #[error("target or message no longer exists")]
    NotFound,

    #[error("rate limited by platform, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("unexpected platform response: {message}")]
    Unexpected { message: String },
}

impl DeliveryError {
    /// Creates forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether the platform refused for lack of permission.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns whether the target or message is gone.
    #[must_use]
    pub const fn is_gone(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
