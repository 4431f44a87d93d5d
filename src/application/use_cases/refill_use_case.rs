//! Prefetch refill tick.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tracing::{debug, warn};

use crate::application::dto::RefillReport;
use crate::application::services::PrefetchCache;
use crate::domain::ports::ImageSourcePort;

/// Maximum fetches a single refill tick keeps in flight.
pub const DEFAULT_REFILL_BATCH: usize = 5;

/// Tops the prefetch cache up from the image source.
#[derive(Clone)]
pub struct RefillUseCase {
    source: Arc<dyn ImageSourcePort>,
    cache: Arc<PrefetchCache>,
    max_batch: usize,
}

impl RefillUseCase {
    /// Creates a refill use case with the default batch size.
    #[must_use]
    pub fn new(source: Arc<dyn ImageSourcePort>, cache: Arc<PrefetchCache>) -> Self {
        Self {
            source,
            cache,
            max_batch: DEFAULT_REFILL_BATCH,
        }
    }

    /// Sets the concurrent fetch cap.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    /// Runs one refill tick.
    ///
    /// Launches `min(needed, max_batch)` fetches at once and appends results in
    /// completion order. Failed and empty fetches are dropped; the next tick
    /// tries again.
    pub async fn execute(&self) -> RefillReport {
        let needed = self.cache.needed();
        if needed == 0 {
            debug!("Prefetch cache full, skipping refill");
            return RefillReport::default();
        }

        let launched = needed.min(self.max_batch);
        let mut report = RefillReport {
            launched,
            ..RefillReport::default()
        };

        let mut pending: FuturesUnordered<_> =
            (0..launched).map(|_| self.source.fetch_one()).collect();

        while let Some(result) = pending.next().await {
            match result {
                Ok(Some(item)) => {
                    if self.cache.push(item) {
                        report.appended += 1;
                    } else {
                        report.overflow += 1;
                    }
                }
                Ok(None) => report.empty += 1,
                Err(e) => {
                    warn!(error = %e, "Prefetch fetch failed");
                    report.failed += 1;
                }
            }
        }

        debug!(
            launched = report.launched,
            appended = report.appended,
            empty = report.empty,
            failed = report.failed,
            cached = self.cache.len(),
            "Prefetch refill finished"
        );

        report
    }
}
