//! Broadcast tick: one image fanned out to every registered target.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::application::dto::{
    DeliveryOutcome, ImageOrigin, SkipReason, TargetDelivery, TickReport,
};
use crate::application::services::{PrefetchCache, TargetRegistry};
use crate::domain::entities::{DeliveryPayload, FeedbackKind, GroupId, ImageItem, TargetId};
use crate::domain::ports::{DeliveryPort, ImageSourcePort};

/// Pops one image and delivers it to every registered target concurrently.
#[derive(Clone)]
pub struct BroadcastUseCase {
    source: Arc<dyn ImageSourcePort>,
    cache: Arc<PrefetchCache>,
    registry: Arc<TargetRegistry>,
    platform: Arc<dyn DeliveryPort>,
}

impl BroadcastUseCase {
    /// Creates a broadcast use case.
    #[must_use]
    pub fn new(
        source: Arc<dyn ImageSourcePort>,
        cache: Arc<PrefetchCache>,
        registry: Arc<TargetRegistry>,
        platform: Arc<dyn DeliveryPort>,
    ) -> Self {
        Self {
            source,
            cache,
            registry,
            platform,
        }
    }

    /// Runs one broadcast tick.
    ///
    /// Per-target failures are recorded in the report and never fail the tick.
    pub async fn execute(&self) -> TickReport {
        let targets = self.registry.snapshot();
        if targets.is_empty() {
            debug!("No delivery targets registered, skipping tick");
            return TickReport::Skipped(SkipReason::NoTargets);
        }

        let Some((item, origin)) = self.next_image().await else {
            debug!("No image available, skipping tick");
            return TickReport::Skipped(SkipReason::NoImage);
        };

        let payload = DeliveryPayload::from_item(&item).with_timestamp(Utc::now());
        let deliveries = join_all(
            targets
                .into_iter()
                .map(|(group, target)| self.deliver(group, target, &payload)),
        )
        .await;

        let report = TickReport::Broadcast {
            item,
            origin,
            deliveries,
        };

        info!(
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            ?origin,
            "Broadcast tick finished"
        );

        report
    }

    async fn next_image(&self) -> Option<(ImageItem, ImageOrigin)> {
        if let Some(item) = self.cache.try_pop() {
            return Some((item, ImageOrigin::Cache));
        }

        match self.source.fetch_one().await {
            Ok(Some(item)) => Some((item, ImageOrigin::OnDemand)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "On-demand fetch failed");
                None
            }
        }
    }

    async fn deliver(
        &self,
        group: GroupId,
        target: TargetId,
        payload: &DeliveryPayload,
    ) -> TargetDelivery {
        let outcome = match self.platform.send(&target, payload).await {
            Ok(message) => {
                let attached = join_all(
                    FeedbackKind::ALL
                        .into_iter()
                        .map(|kind| self.platform.add_feedback_affordance(&message, kind)),
                )
                .await;

                let mut affordances = 0;
                for result in attached {
                    match result {
                        Ok(()) => affordances += 1,
                        Err(e) => {
                            debug!(message = %message, error = %e, "Failed to attach feedback affordance");
                        }
                    }
                }

                DeliveryOutcome::Delivered {
                    message,
                    affordances,
                }
            }
            Err(e) => {
                warn!(group = %group, target = %target, error = %e, "Delivery failed");
                DeliveryOutcome::from_error(e)
            }
        };

        TargetDelivery {
            group,
            target,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchError;
    use crate::domain::ports::RegistryEntries;
    use crate::domain::ports::mocks::{
        MockDelivery, MockImageSource, MockRegistryStorePort, TargetBehavior,
    };

    struct Harness {
        source: Arc<MockImageSource>,
        cache: Arc<PrefetchCache>,
        platform: Arc<MockDelivery>,
        use_case: BroadcastUseCase,
    }

    async fn harness(source: MockImageSource, platform: MockDelivery, groups: &[(u64, u64)]) -> Harness {
        let mut store = MockRegistryStorePort::new();
        let entries: RegistryEntries = groups
            .iter()
            .map(|(g, t)| (GroupId::from(*g), TargetId::from(*t)))
            .collect();
        store.expect_load().returning(move || Ok(entries.clone()));

        let source = Arc::new(source);
        let platform = Arc::new(platform);
        let cache = Arc::new(PrefetchCache::new(10));
        let registry = Arc::new(TargetRegistry::new(Arc::new(store), platform.clone()));
        registry.load().await;

        let use_case =
            BroadcastUseCase::new(source.clone(), cache.clone(), registry, platform.clone());

        Harness {
            source,
            cache,
            platform,
            use_case,
        }
    }

    #[tokio::test]
    async fn test_no_targets_means_no_fetch_and_no_send() {
        let h = harness(MockImageSource::new(), MockDelivery::new(), &[]).await;
        h.cache.push(ImageItem::new("https://img.test/cached.png"));

        let report = h.use_case.execute().await;

        assert!(matches!(report, TickReport::Skipped(SkipReason::NoTargets)));
        assert_eq!(h.source.calls(), 0);
        assert_eq!(h.cache.len(), 1);
        assert!(h.platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_target_is_isolated() {
        let platform = MockDelivery::new()
            .with_target(10_u64, TargetBehavior::Accept)
            .with_target(20_u64, TargetBehavior::Forbidden)
            .with_target(30_u64, TargetBehavior::Accept);
        let h = harness(
            MockImageSource::new(),
            platform,
            &[(1, 10), (2, 20), (3, 30)],
        )
        .await;

        let report = h.use_case.execute().await;

        let delivered = h.platform.delivered_targets();
        assert!(delivered.contains(&TargetId::from(10_u64)));
        assert!(delivered.contains(&TargetId::from(30_u64)));
        assert!(!delivered.contains(&TargetId::from(20_u64)));
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(report.failed_count(), 1);

        let TickReport::Broadcast { deliveries, .. } = report else {
            panic!("expected a broadcast");
        };
        let forbidden = deliveries
            .iter()
            .find(|d| d.target == TargetId::from(20_u64))
            .unwrap();
        assert!(matches!(forbidden.outcome, DeliveryOutcome::Forbidden));
    }

    #[tokio::test]
    async fn test_gone_and_broken_targets_are_isolated() {
        let platform = MockDelivery::new()
            .with_target(10_u64, TargetBehavior::Gone)
            .with_target(20_u64, TargetBehavior::Broken)
            .with_target(30_u64, TargetBehavior::Accept);
        let h = harness(
            MockImageSource::new(),
            platform,
            &[(1, 10), (2, 20), (3, 30)],
        )
        .await;

        let report = h.use_case.execute().await;

        assert_eq!(report.delivered_count(), 1);
        let TickReport::Broadcast { deliveries, .. } = report else {
            panic!("expected a broadcast");
        };
        assert!(
            deliveries
                .iter()
                .any(|d| matches!(d.outcome, DeliveryOutcome::TargetGone))
        );
        assert!(
            deliveries
                .iter()
                .any(|d| matches!(d.outcome, DeliveryOutcome::Failed(_)))
        );
    }

    #[tokio::test]
    async fn test_prefers_cached_image() {
        let platform = MockDelivery::new().with_target(10_u64, TargetBehavior::Accept);
        let h = harness(MockImageSource::new(), platform, &[(1, 10)]).await;
        h.cache.push(ImageItem::new("https://img.test/cached.png"));

        let report = h.use_case.execute().await;

        assert!(matches!(
            report,
            TickReport::Broadcast {
                origin: ImageOrigin::Cache,
                ..
            }
        ));
        assert_eq!(h.source.calls(), 0);
        assert_eq!(
            h.platform.sent(),
            vec![(
                TargetId::from(10_u64),
                "https://img.test/cached.png".to_string()
            )]
        );
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_on_demand_fetch() {
        let platform = MockDelivery::new().with_target(10_u64, TargetBehavior::Accept);
        let h = harness(MockImageSource::new(), platform, &[(1, 10)]).await;

        let report = h.use_case.execute().await;

        assert!(matches!(
            report,
            TickReport::Broadcast {
                origin: ImageOrigin::OnDemand,
                ..
            }
        ));
        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_when_nothing_available() {
        let platform = MockDelivery::new().with_target(10_u64, TargetBehavior::Accept);
        let source = MockImageSource::scripted([Err(FetchError::Timeout)]);
        let h = harness(source, platform, &[(1, 10)]).await;

        let report = h.use_case.execute().await;

        assert!(matches!(report, TickReport::Skipped(SkipReason::NoImage)));
        assert!(h.platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_affordances_attached_after_delivery() {
        let platform = MockDelivery::new()
            .with_target(10_u64, TargetBehavior::Accept)
            .with_target(20_u64, TargetBehavior::NoReactions);
        let h = harness(MockImageSource::new(), platform, &[(1, 10), (2, 20)]).await;

        let report = h.use_case.execute().await;

        assert_eq!(report.delivered_count(), 2);
        let kinds: Vec<_> = h.platform.affordances().into_iter().map(|(_, k)| k).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&FeedbackKind::Approve));
        assert!(kinds.contains(&FeedbackKind::Reject));

        let TickReport::Broadcast { deliveries, .. } = report else {
            panic!("expected a broadcast");
        };
        for delivery in deliveries {
            let DeliveryOutcome::Delivered { affordances, .. } = delivery.outcome else {
                panic!("expected delivery");
            };
            let expected = if delivery.target == TargetId::from(10_u64) { 2 } else { 0 };
            assert_eq!(affordances, expected);
        }
    }
}
