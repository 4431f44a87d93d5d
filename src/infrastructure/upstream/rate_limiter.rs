//! Minimum-interval request gate.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Default upstream request rate, per second.
pub const DEFAULT_RATE_LIMIT: f64 = 1.0;

/// Serializes grants so consecutive grants are at least `interval` apart.
///
/// Waiters queue on a fair mutex, so grants follow call order.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter granting at most `rate` requests per second.
    ///
    /// A non-positive or non-finite rate disables limiting.
    #[must_use]
    pub fn per_second(rate: f64) -> Self {
        let interval = if rate.is_finite() && rate > 0.0 {
            Duration::from_secs_f64(1.0 / rate)
        } else {
            Duration::ZERO
        };
        Self::with_interval(interval)
    }

    /// Creates a limiter with an explicit minimum interval.
    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Returns the minimum interval between grants.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request may start and records the grant.
    pub async fn reserve(&self) -> Instant {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            sleep_until(previous + self.interval).await;
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(DEFAULT_RATE_LIMIT)
    }
}
