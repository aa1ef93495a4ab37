//! Token bucket enforcing spacing between calls to one host.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::limit::clock::Clock;

/// A token bucket measured in time credit.
///
/// Each call costs one `interval` of credit; credit accrues with elapsed time
/// up to `capacity` intervals. With capacity 1 this is a plain minimum spacing
/// between consecutive calls. Waiters queue on the internal lock, so calls to
/// one bucket are serialized while other buckets proceed independently.
#[derive(Debug)]
pub struct TokenBucket {
    interval: Duration,
    max_credit: Duration,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    credit: Duration,
    last: Option<DateTime<Utc>>,
}

impl TokenBucket {
    /// Create a bucket allowing `capacity` back-to-back calls, refilling one
    /// call every `interval`. The bucket starts full.
    pub fn new(capacity: u32, interval: Duration) -> Self {
        let max_credit = interval * capacity.max(1);
        Self {
            interval,
            max_credit,
            state: Mutex::new(BucketState {
                credit: max_credit,
                last: None,
            }),
        }
    }

    /// Take one token, waiting on `clock` until one is available.
    ///
    /// Returns how long the caller waited.
    pub async fn acquire(&self, clock: &dyn Clock) -> Duration {
        if self.interval.is_zero() {
            return Duration::ZERO;
        }

        let mut state = self.state.lock().await;
        let mut waited = Duration::ZERO;

        loop {
            let now = clock.now();
            if let Some(last) = state.last {
                let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
                state.credit = (state.credit + elapsed).min(self.max_credit);
            }
            state.last = Some(now);

            if state.credit >= self.interval {
                state.credit -= self.interval;
                return waited;
            }

            let wait = self.interval - state.credit;
            tracing::debug!("Rate limiter waiting for {:?}", wait);
            clock.sleep(wait).await;
            waited += wait;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::clock::ManualClock;

    #[tokio::test]
    async fn test_first_call_is_immediate() {
        let clock = ManualClock::default();
        let bucket = TokenBucket::new(1, Duration::from_secs(2));

        assert_eq!(bucket.acquire(&clock).await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_back_to_back_calls_are_spaced() {
        let clock = ManualClock::default();
        let bucket = TokenBucket::new(1, Duration::from_secs(2));

        bucket.acquire(&clock).await;
        clock.advance(Duration::from_millis(500));
        let waited = bucket.acquire(&clock).await;

        assert_eq!(waited, Duration::from_millis(1500));
        assert_eq!(clock.total_slept(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_elapsed() {
        let clock = ManualClock::default();
        let bucket = TokenBucket::new(1, Duration::from_secs(2));

        bucket.acquire(&clock).await;
        clock.advance(Duration::from_secs(5));

        assert_eq!(bucket.acquire(&clock).await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_capacity_allows_burst() {
        let clock = ManualClock::default();
        let bucket = TokenBucket::new(3, Duration::from_secs(1));

        for _ in 0..3 {
            assert_eq!(bucket.acquire(&clock).await, Duration::ZERO);
        }
        assert_eq!(bucket.acquire(&clock).await, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_interval_is_unlimited() {
        let clock = ManualClock::default();
        let bucket = TokenBucket::new(1, Duration::ZERO);

        for _ in 0..10 {
            assert_eq!(bucket.acquire(&clock).await, Duration::ZERO);
        }
    }
}
