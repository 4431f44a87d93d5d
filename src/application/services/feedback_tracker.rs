//! Reaction-driven retraction of delivered images.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::application::dto::RetractionOutcome;
use crate::domain::entities::{FeedbackEvent, FeedbackKind, MessageRef};
use crate::domain::ports::DeliveryPort;

/// Reject count that must be exceeded before a message is retracted.
pub const DEFAULT_REJECT_THRESHOLD: u32 = 5;

/// Notice posted where a retracted image used to be.
pub const DEFAULT_RETRACTION_NOTICE: &str = "Image deleted due to negative feedback.";

/// Number of retracted messages remembered.
pub const DEFAULT_TRACKED_MESSAGES: usize = 1024;

/// Watches reactions on delivered images and retracts rejected ones.
pub struct FeedbackTracker {
    platform: Arc<dyn DeliveryPort>,
    threshold: u32,
    notice: String,
    retracted: Mutex<LruCache<MessageRef, ()>>,
}

impl FeedbackTracker {
    /// Creates a tracker with default threshold and notice.
    #[must_use]
    pub fn new(platform: Arc<dyn DeliveryPort>) -> Self {
        Self {
            platform,
            threshold: DEFAULT_REJECT_THRESHOLD,
            notice: DEFAULT_RETRACTION_NOTICE.to_string(),
            retracted: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_TRACKED_MESSAGES).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Sets the reject threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the replacement notice.
    #[must_use]
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = notice.into();
        self
    }

    /// Sets how many retracted messages are remembered.
    #[must_use]
    pub fn with_memory(mut self, messages: usize) -> Self {
        let cap = NonZeroUsize::new(messages).unwrap_or(NonZeroUsize::MIN);
        self.retracted = Mutex::new(LruCache::new(cap));
        self
    }

    /// Returns the reject threshold.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Applies the retraction rule to one observed reaction.
    ///
    /// Platform errors while retracting are swallowed.
    pub async fn observe(&self, event: &FeedbackEvent) -> RetractionOutcome {
        if event.reactor_is_bot || !event.authored_by_self {
            return RetractionOutcome::Ignored;
        }

        match event.kind() {
            Some(FeedbackKind::Reject) => {}
            Some(FeedbackKind::Approve) | None => return RetractionOutcome::Ignored,
        }

        if event.count <= self.threshold {
            return RetractionOutcome::BelowThreshold;
        }

        if self
            .retracted
            .lock()
            .put(event.message.clone(), ())
            .is_some()
        {
            return RetractionOutcome::AlreadyRetracted;
        }

        if let Err(e) = self.platform.delete_message(&event.message).await {
            debug!(message = %event.message, error = %e, "Retraction delete failed");
            return RetractionOutcome::Abandoned;
        }

        let notice_posted = match self
            .platform
            .send_notice(&event.message.target, &self.notice)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!(target = %event.message.target, error = %e, "Retraction notice failed");
                false
            }
        };

        info!(
            message = %event.message,
            rejects = event.count,
            "Retracted image after negative feedback"
        );

        RetractionOutcome::Retracted { notice_posted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TargetId;
    use crate::domain::ports::mocks::{MockDelivery, TargetBehavior};
    use test_case::test_case;

    fn message() -> MessageRef {
        MessageRef::new(TargetId::from(10_u64), "555")
    }

    fn setup() -> (Arc<MockDelivery>, FeedbackTracker) {
        let platform = Arc::new(MockDelivery::new().with_target(10_u64, TargetBehavior::Accept));
        let tracker = FeedbackTracker::new(platform.clone());
        (platform, tracker)
    }

    async fn reject_times(tracker: &FeedbackTracker, times: u32) -> Vec<RetractionOutcome> {
        let mut outcomes = Vec::new();
        for count in 1..=times {
            let event = FeedbackEvent::new(message(), FeedbackKind::Reject, count);
            outcomes.push(tracker.observe(&event).await);
        }
        outcomes
    }

    #[tokio::test]
    async fn test_six_rejects_retract_the_message() {
        let (platform, tracker) = setup();

        let outcomes = reject_times(&tracker, 6).await;

        assert_eq!(
            outcomes.last(),
            Some(&RetractionOutcome::Retracted {
                notice_posted: true
            })
        );
        assert_eq!(platform.deleted(), vec![message()]);
        assert_eq!(
            platform.notices(),
            vec![(TargetId::from(10_u64), DEFAULT_RETRACTION_NOTICE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_five_rejects_leave_the_message() {
        let (platform, tracker) = setup();

        let outcomes = reject_times(&tracker, 5).await;

        assert!(
            outcomes
                .iter()
                .all(|o| *o == RetractionOutcome::BelowThreshold)
        );
        assert!(platform.deleted().is_empty());
        assert!(platform.notices().is_empty());
    }

    #[tokio::test]
    async fn test_retraction_attempted_once() {
        let (platform, tracker) = setup();

        let outcomes = reject_times(&tracker, 8).await;

        assert_eq!(outcomes[6], RetractionOutcome::AlreadyRetracted);
        assert_eq!(outcomes[7], RetractionOutcome::AlreadyRetracted);
        assert_eq!(platform.deleted().len(), 1);
        assert_eq!(platform.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let platform = Arc::new(
            MockDelivery::new()
                .with_target(10_u64, TargetBehavior::Accept)
                .refusing_delete(),
        );
        let tracker = FeedbackTracker::new(platform.clone());

        let event = FeedbackEvent::new(message(), FeedbackKind::Reject, 6);
        assert_eq!(tracker.observe(&event).await, RetractionOutcome::Abandoned);
        assert_eq!(
            tracker.observe(&event).await,
            RetractionOutcome::AlreadyRetracted
        );
        assert!(platform.notices().is_empty());
    }

    #[test_case(FeedbackEvent::new(message(), FeedbackKind::Approve, 50) ; "approve_is_read_only")]
    #[test_case(FeedbackEvent::new(message(), FeedbackKind::Reject, 50).from_bot() ; "bot_reactor")]
    #[test_case(FeedbackEvent::new(message(), FeedbackKind::Reject, 50).on_foreign_message() ; "foreign_message")]
    #[tokio::test]
    async fn test_irrelevant_events_are_ignored(event: FeedbackEvent) {
        let (platform, tracker) = setup();

        assert_eq!(tracker.observe(&event).await, RetractionOutcome::Ignored);
        assert!(platform.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_emoji_is_ignored() {
        let (_, tracker) = setup();
        let mut event = FeedbackEvent::new(message(), FeedbackKind::Reject, 50);
        event.emoji = "\u{1F525}".to_string();

        assert_eq!(tracker.observe(&event).await, RetractionOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let (platform, tracker) = setup();
        let tracker = tracker.with_threshold(1).with_notice("gone");

        let outcomes = reject_times(&tracker, 2).await;

        assert_eq!(outcomes[0], RetractionOutcome::BelowThreshold);
        assert_eq!(
            outcomes[1],
            RetractionOutcome::Retracted {
                notice_posted: true
            }
        );
        assert_eq!(platform.notices()[0].1, "gone");
    }
}
