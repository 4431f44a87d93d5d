//! Target registration errors.

use thiserror::Error;

use crate::domain::entities::{GroupId, TargetId};

/// Errors surfaced to whoever configures delivery targets.
///
/// These are user mistakes, not faults, and are never logged as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum RegistryError {
    #[error("group {group} already has a delivery target")]
    AlreadyRegistered { group: GroupId },

    #[error("group {group} has no delivery target")]
    NotRegistered { group: GroupId },

    #[error("target {target} does not resolve to a channel")]
    InvalidTarget { target: TargetId },
}

impl RegistryError {
    /// Returns the reply shown to the person who triggered the operation.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered { .. } => "This guild already has auto-waifu enabled.",
            Self::NotRegistered { .. } => "This guild doesn't have an auto-waifu channel set.",
            Self::InvalidTarget { .. } => "Invalid channel ID provided, please try again!",
        }
    }
}
