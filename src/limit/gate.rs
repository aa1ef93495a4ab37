//! Quota gate consulted before each dispatch to a host.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::limit::backoff::retry_with_backoff;
use crate::limit::bucket::TokenBucket;
use crate::limit::clock::Clock;
use crate::media::HostType;
use crate::resolve::Resolver;

/// Attempts for a quota refresh before giving up.
const QUOTA_ATTEMPTS: u32 = 3;

/// Per-host spacing and quota enforcement.
#[derive(Debug)]
pub struct QuotaGate {
    clock: Arc<dyn Clock>,
    buckets: HashMap<HostType, TokenBucket>,
}

impl QuotaGate {
    /// A gate with no limits configured.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            buckets: HashMap::new(),
        }
    }

    /// Require `interval` between calls to `host`, allowing bursts of `capacity`.
    pub fn with_limit(mut self, host: HostType, capacity: u32, interval: Duration) -> Self {
        self.buckets.insert(host, TokenBucket::new(capacity, interval));
        self
    }

    /// Wait for `host`'s turn, then check its remaining quota.
    ///
    /// Spacing applies whether or not the previous call succeeded. Returns
    /// `Error::QuotaExceeded` when a quota window is used up, and propagates
    /// authentication failures from the quota refresh unchanged.
    pub async fn before_dispatch(&self, host: HostType, resolver: &dyn Resolver) -> Result<()> {
        if let Some(bucket) = self.buckets.get(&host) {
            let waited = bucket.acquire(self.clock.as_ref()).await;
            if !waited.is_zero() {
                tracing::debug!("Waited {:?} before dispatching to {}", waited, host);
            }
        }

        let quota = retry_with_backoff(self.clock.as_ref(), QUOTA_ATTEMPTS, || resolver.quota()).await?;
        let Some(quota) = quota else {
            return Ok(());
        };

        let reset = quota.describe_reset(self.clock.now());
        tracing::info!(
            "{} quota: user {} - client {} - reset {}",
            host,
            quota.short_remaining,
            quota.long_remaining,
            reset
        );

        match quota.exhausted() {
            Some(window) => Err(Error::QuotaExceeded { window, reset }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::limit::clock::ManualClock;
    use crate::limit::quota::{QuotaState, QuotaWindow};
    use crate::media::{PostDescriptor, ResourceDescriptor};

    #[derive(Debug)]
    struct QuotaResolver {
        quota: Option<QuotaState>,
        quota_calls: AtomicU32,
    }

    #[async_trait]
    impl Resolver for QuotaResolver {
        async fn resolve(&self, _post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
            Ok(Vec::new())
        }

        async fn quota(&self) -> Result<Option<QuotaState>> {
            self.quota_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.quota)
        }
    }

    fn resolver(quota: Option<QuotaState>) -> QuotaResolver {
        QuotaResolver {
            quota,
            quota_calls: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn test_spacing_between_dispatches() {
        let clock = Arc::new(ManualClock::default());
        let gate = QuotaGate::new(clock.clone()).with_limit(HostType::Imgur, 1, Duration::from_secs(2));
        let r = resolver(None);

        gate.before_dispatch(HostType::Imgur, &r).await.unwrap();
        gate.before_dispatch(HostType::Imgur, &r).await.unwrap();
        gate.before_dispatch(HostType::Imgur, &r).await.unwrap();

        assert_eq!(clock.total_slept(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_unlimited_host_never_waits() {
        let clock = Arc::new(ManualClock::default());
        let gate = QuotaGate::new(clock.clone()).with_limit(HostType::Imgur, 1, Duration::from_secs(2));
        let r = resolver(None);

        for _ in 0..5 {
            gate.before_dispatch(HostType::Direct, &r).await.unwrap();
        }

        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_exhausted_quota_is_reported() {
        let clock = Arc::new(ManualClock::default());
        let gate = QuotaGate::new(clock.clone());
        let r = resolver(Some(QuotaState {
            short_remaining: 0,
            long_remaining: 100,
            reset_at: Some(clock.now() + chrono::Duration::seconds(90)),
        }));

        let err = gate.before_dispatch(HostType::Imgur, &r).await.unwrap_err();

        match &err {
            Error::QuotaExceeded { window, reset } => {
                assert_eq!(*window, QuotaWindow::Short);
                assert_eq!(reset, "after 1 Minutes 30 Seconds");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("LIMIT EXCEEDED"));
    }

    #[tokio::test]
    async fn test_quota_refreshed_every_dispatch() {
        let clock = Arc::new(ManualClock::default());
        let gate = QuotaGate::new(clock);
        let r = resolver(Some(QuotaState {
            short_remaining: 5,
            long_remaining: 5,
            reset_at: None,
        }));

        gate.before_dispatch(HostType::Imgur, &r).await.unwrap();
        gate.before_dispatch(HostType::Imgur, &r).await.unwrap();

        assert_eq!(r.quota_calls.load(Ordering::SeqCst), 2);
    }
}
