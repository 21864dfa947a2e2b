//! @ai:module:intent Pace requests to a remote grader endpoint
//! @ai:module:layer infrastructure
//! @ai:module:public_api RateLimiter, RateLimiterTrait
//! @ai:module:stateless false

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// @ai:intent Trait for request pacing
pub trait RateLimiterTrait: Send + Sync {
    /// @ai:intent Reserve the next send slot and sleep until it arrives
    fn acquire(&self) -> impl std::future::Future<Output = ()> + Send;
}

/// @ai:intent Slot scheduler allowing a burst of one minute's budget, then one request per interval
///            Slots are handed out in call order; 0 requests per minute disables pacing
pub struct RateLimiter {
    /// Theoretical arrival time of the next request when sending at exactly the steady rate
    next_slot: Mutex<Option<Instant>>,
    interval: Option<Duration>,
    burst_window: Duration,
}

impl RateLimiter {
    /// @ai:intent Create a limiter for `per_minute` requests, all of which may go out at once
    /// @ai:effects pure
    /// @ai:example (60) -> 60 immediate slots, then one per second
    pub fn new(per_minute: u32) -> Self {
        let interval = (per_minute > 0).then(|| Duration::from_secs(60) / per_minute);
        let burst_window = interval
            .map(|step| step * per_minute.saturating_sub(1))
            .unwrap_or_default();

        Self {
            next_slot: Mutex::new(None),
            interval,
            burst_window,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.interval.is_none()
    }

    /// @ai:intent Claim a slot and return the instant it opens
    /// @ai:effects state:write, time
    async fn reserve(&self, interval: Duration) -> Instant {
        let now = Instant::now();
        let mut next_slot = self.next_slot.lock().await;

        let tat = next_slot.map_or(now, |t| t.max(now));
        let opens_at = tat.checked_sub(self.burst_window).map_or(now, |t| t.max(now));
        *next_slot = Some(tat + interval);

        opens_at
    }
}

impl RateLimiterTrait for RateLimiter {
    /// @ai:effects state:write, time
    async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let opens_at = self.reserve(interval).await;
        if opens_at > Instant::now() {
            tracing::debug!("Rate limited for {:?}", opens_at - Instant::now());
            tokio::time::sleep_until(opens_at).await;
        }
    }
}
