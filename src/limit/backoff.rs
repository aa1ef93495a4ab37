//! Jittered retry for idempotent requests.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::Result;
use crate::limit::clock::Clock;

/// Base delay before the first retry.
const BASE_DELAY_MS: u64 = 500;

/// Run `op` up to `attempts` times, retrying only transient errors.
///
/// Delays double after each failure, plus up to 50% random jitter.
pub async fn retry_with_backoff<T, F, Fut>(clock: &dyn Clock, attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_transient() => {
                let delay = backoff_delay(attempt);
                tracing::debug!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                clock.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = BASE_DELAY_MS << (attempt - 1).min(6);
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::Error;
    use crate::limit::clock::ManualClock;

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let clock = ManualClock::default();
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(&clock, 3, || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::Api("HTTP 502".into()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(clock.total_slept() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let clock = ManualClock::default();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&clock, 5, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Authentication("HTTP 403".into()))
        })
        .await;

        assert!(matches!(result, Err(Error::Authentication(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[test]
    fn test_backoff_delay_grows() {
        let first = backoff_delay(1);
        let third = backoff_delay(3);
        assert!(first >= Duration::from_millis(500) && first <= Duration::from_millis(750));
        assert!(third >= Duration::from_millis(2000) && third <= Duration::from_millis(3000));
    }
}
