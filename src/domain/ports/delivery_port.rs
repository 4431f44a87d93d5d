//! Platform delivery port definition.

use async_trait::async_trait;

use crate::domain::entities::{DeliveryPayload, FeedbackKind, GroupId, MessageRef, TargetId};
use crate::domain::errors::DeliveryError;

/// Port for posting to and managing messages in delivery targets.
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Checks whether the target resolves to a living channel inside the group.
    async fn target_exists(&self, group: &GroupId, target: &TargetId)
    -> Result<bool, DeliveryError>;

    /// Sends the payload to a target.
    async fn send(
        &self,
        target: &TargetId,
        payload: &DeliveryPayload,
    ) -> Result<MessageRef, DeliveryError>;

    /// Attaches a feedback affordance to a delivered message.
    async fn add_feedback_affordance(
        &self,
        message: &MessageRef,
        kind: FeedbackKind,
    ) -> Result<(), DeliveryError>;

    /// Deletes a delivered message.
    async fn delete_message(&self, message: &MessageRef) -> Result<(), DeliveryError>;

    /// Posts a plain text notice to a target.
    async fn send_notice(&self, target: &TargetId, content: &str)
    -> Result<MessageRef, DeliveryError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    /// Scripted per-target behaviour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TargetBehavior {
        /// Every call succeeds.
        Accept,
        /// Sends fail with `Forbidden`.
        Forbidden,
        /// Sends fail with `NotFound`.
        Gone,
        /// Sends fail with a transport error.
        Broken,
        /// Sends succeed but reactions are refused.
        NoReactions,
    }

    /// Mock delivery platform for testing.
    #[derive(Default)]
    pub struct MockDelivery {
        behaviors: Mutex<HashMap<TargetId, TargetBehavior>>,
        known: Mutex<HashSet<TargetId>>,
        sent: Mutex<Vec<(TargetId, String)>>,
        affordances: Mutex<Vec<(MessageRef, FeedbackKind)>>,
        deleted: Mutex<Vec<MessageRef>>,
        notices: Mutex<Vec<(TargetId, String)>>,
        refuse_delete: Mutex<bool>,
        next_id: AtomicU64,
    }

    impl MockDelivery {
        /// Creates a platform where no target resolves.
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a resolvable target with the given behaviour.
        pub fn with_target(self, target: impl Into<TargetId>, behavior: TargetBehavior) -> Self {
            let target = target.into();
            self.known.lock().insert(target.clone());
            self.behaviors.lock().insert(target, behavior);
            self
        }

        /// Makes message deletion fail with `Forbidden`.
        pub fn refusing_delete(self) -> Self {
            *self.refuse_delete.lock() = true;
            self
        }

        /// Marks a target as no longer resolving.
        pub fn remove_target(&self, target: &TargetId) {
            self.known.lock().remove(target);
        }

        /// Images delivered so far as `(target, url)`.
        pub fn sent(&self) -> Vec<(TargetId, String)> {
            self.sent.lock().clone()
        }

        /// Targets that received an image.
        pub fn delivered_targets(&self) -> HashSet<TargetId> {
            self.sent.lock().iter().map(|(t, _)| t.clone()).collect()
        }

        /// Affordances attached so far.
        pub fn affordances(&self) -> Vec<(MessageRef, FeedbackKind)> {
            self.affordances.lock().clone()
        }

        /// Messages deleted so far.
        pub fn deleted(&self) -> Vec<MessageRef> {
            self.deleted.lock().clone()
        }

        /// Notices posted so far.
        pub fn notices(&self) -> Vec<(TargetId, String)> {
            self.notices.lock().clone()
        }

        fn behavior(&self, target: &TargetId) -> TargetBehavior {
            self.behaviors
                .lock()
                .get(target)
                .copied()
                .unwrap_or(TargetBehavior::Gone)
        }

        fn next_message(&self, target: &TargetId) -> MessageRef {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            MessageRef::new(target.clone(), id.to_string())
        }
    }

    #[async_trait]
    impl DeliveryPort for MockDelivery {
        async fn target_exists(
            &self,
            _group: &GroupId,
            target: &TargetId,
        ) -> Result<bool, DeliveryError> {
            Ok(self.known.lock().contains(target))
        }

        async fn send(
            &self,
            target: &TargetId,
            payload: &DeliveryPayload,
        ) -> Result<MessageRef, DeliveryError> {
            tokio::task::yield_now().await;
            match self.behavior(target) {
                TargetBehavior::Accept | TargetBehavior::NoReactions => {
                    self.sent
                        .lock()
                        .push((target.clone(), payload.image_url().to_string()));
                    Ok(self.next_message(target))
                }
                TargetBehavior::Forbidden => Err(DeliveryError::forbidden("missing access")),
                TargetBehavior::Gone => Err(DeliveryError::NotFound),
                TargetBehavior::Broken => Err(DeliveryError::transport("connection reset")),
            }
        }

        async fn add_feedback_affordance(
            &self,
            message: &MessageRef,
            kind: FeedbackKind,
        ) -> Result<(), DeliveryError> {
            if self.behavior(&message.target) == TargetBehavior::NoReactions {
                return Err(DeliveryError::forbidden("missing add reactions"));
            }
            self.affordances.lock().push((message.clone(), kind));
            Ok(())
        }

        async fn delete_message(&self, message: &MessageRef) -> Result<(), DeliveryError> {
            if *self.refuse_delete.lock() {
                return Err(DeliveryError::forbidden("missing manage messages"));
            }
            let mut deleted = self.deleted.lock();
            if deleted.contains(message) {
                return Err(DeliveryError::NotFound);
            }
            deleted.push(message.clone());
            Ok(())
        }

        async fn send_notice(
            &self,
            target: &TargetId,
            content: &str,
        ) -> Result<MessageRef, DeliveryError> {
            self.notices
                .lock()
                .push((target.clone(), content.to_string()));
            Ok(self.next_message(target))
        }
    }
}
