//! Upstream image fetch errors.

use thiserror::Error;

/// Transport-level failure while talking to the image API.
///
/// Non-success statuses and malformed bodies are not errors; they surface as
/// an empty fetch result instead.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("request to image API timed out")]
    Timeout,

    #[error("network error contacting image API: {message}")]
    Network { message: String },

    #[error("failed to open HTTP session: {message}")]
    SessionUnavailable { message: String },

    #[error("fetch client is closed")]
    Closed,
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates session error.
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionUnavailable {
            message: message.into(),
        }
    }

    /// Returns whether the next scheduled attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network { .. })
    }
}

