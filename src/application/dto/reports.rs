//! Outcome reports produced by the periodic tasks and configuration calls.

use crate::domain::entities::{GroupId, ImageItem, MessageRef, TargetId};
use crate::domain::errors::DeliveryError;

/// Result of one prefetch refill tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillReport {
    /// Fetches launched concurrently.
    pub launched: usize,
    /// Images appended to the cache.
    pub appended: usize,
    /// Fetches that answered with nothing usable.
    pub empty: usize,
    /// Fetches that failed at the transport level.
    pub failed: usize,
    /// Images dropped because the cache filled up meanwhile.
    pub overflow: usize,
}

impl RefillReport {
    /// Returns whether the tick had nothing to do.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.launched == 0
    }
}

/// Where a broadcast image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Popped from the prefetch cache.
    Cache,
    /// Fetched on demand because the cache was empty.
    OnDemand,
}

/// Why a broadcast tick delivered nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No targets are registered.
    NoTargets,
    /// Neither the cache nor an on-demand fetch produced an image.
    NoImage,
}

/// Outcome of delivering to a single target.
#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    /// Message posted; `affordances` counts reactions attached.
    Delivered {
        /// The posted message.
        message: MessageRef,
        /// Number of feedback affordances attached.
        affordances: usize,
    },
    /// Missing permission in the target.
    Forbidden,
    /// Target no longer exists.
    TargetGone,
    /// Any other failure.
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    /// Classifies a send failure.
    #[must_use]
    pub fn from_error(error: DeliveryError) -> Self {
        if error.is_forbidden() {
            Self::Forbidden
        } else if error.is_gone() {
            Self::TargetGone
        } else {
            Self::Failed(error)
        }
    }

    /// Returns whether the image reached the target.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Delivery outcome for one registry entry.
#[derive(Debug, Clone)]
pub struct TargetDelivery {
    /// Group owning the target.
    pub group: GroupId,
    /// Target delivered to.
    pub target: TargetId,
    /// What happened.
    pub outcome: DeliveryOutcome,
}

/// Result of one broadcast tick.
#[derive(Debug, Clone)]
pub enum TickReport {
    /// Nothing was sent.
    Skipped(SkipReason),
    /// An image was fanned out to every registered target.
    Broadcast {
        /// The image sent.
        item: ImageItem,
        /// Where the image came from.
        origin: ImageOrigin,
        /// One entry per registered target.
        deliveries: Vec<TargetDelivery>,
    },
}

impl TickReport {
    /// Number of targets that received the image.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        match self {
            Self::Skipped(_) => 0,
            Self::Broadcast { deliveries, .. } => deliveries
                .iter()
                .filter(|d| d.outcome.is_delivered())
                .count(),
        }
    }

    /// Number of targets whose delivery failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        match self {
            Self::Skipped(_) => 0,
            Self::Broadcast { deliveries, .. } => deliveries.len() - self.delivered_count(),
        }
    }
}

/// Current registration of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Group has no target.
    NotRegistered,
    /// Group has a target that still resolves.
    Active(TargetId),
    /// Group has a target that no longer resolves.
    Dangling(TargetId),
}

impl RegistrationStatus {
    /// Returns the reply shown to the person who asked.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotRegistered => "Auto-waifu is not enabled for this guild.".to_string(),
            Self::Active(target) => format!(
                "Auto-waifu is currently enabled for channel: {}",
                target.mention()
            ),
            Self::Dangling(_) => {
                "Auto-waifu is enabled, but the channel no longer exists.".to_string()
            }
        }
    }
}

/// Result of observing one feedback event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractionOutcome {
    /// Event is not relevant (bot reactor, foreign message, approve, other emoji).
    Ignored,
    /// Reject count is at or below the threshold.
    BelowThreshold,
    /// Retraction for this message was already attempted.
    AlreadyRetracted,
    /// Message deleted; `notice_posted` tells whether the notice went out.
    Retracted {
        /// Whether the replacement notice was posted.
        notice_posted: bool,
    },
    /// Deletion failed and was swallowed.
    Abandoned,
}
