use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::aggregator::{Aggregate, AggregationResult};
use crate::core::cache::Cache;
use crate::store::memory::MemoryCache;

const BREAKDOWN_KEY: &str = "breakdown";

/// Serves a recent LIVE breakdown for up to `ttl` instead of hitting every
/// external source on each request. NO_DATA and ERROR results are not kept,
/// but they are still shared with every request that waited on that refresh.
pub struct CachingAggregator<T: Aggregate> {
    inner: T,
    ttl: Duration,
    cache: MemoryCache<&'static str, AggregationResult>,
    /// Result of the latest refresh, whatever its status.
    refresh: Mutex<Option<AggregationResult>>,
    /// Number of completed refreshes.
    generation: AtomicU64,
}

impl<T: Aggregate> CachingAggregator<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: MemoryCache::new(),
            refresh: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl<T: Aggregate> Aggregate for CachingAggregator<T> {
    async fn aggregate(&self) -> AggregationResult {
        // Any refresh that completes after this point answers this request too.
        let seen = self.generation.load(Ordering::Acquire);
        if let Some(cached) = self.cache.get(&BREAKDOWN_KEY).await {
            return cached;
        }

        let mut last = self.refresh.lock().await;
        if let Some(shared) = last
            .as_ref()
            .filter(|_| self.generation.load(Ordering::Acquire) != seen)
        {
            debug!(status = %shared.status, "Reusing concurrent refresh");
            return shared.clone();
        }

        debug!("Refreshing indicator breakdown");
        let result = self.inner.aggregate().await;
        if result.is_live() {
            self.cache
                .put(BREAKDOWN_KEY, result.clone(), Some(self.ttl))
                .await;
        }
        *last = Some(result.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::DataStatus;
    use crate::core::config::default_indicators;
    use crate::core::indicator::Indicator;
    use chrono::Utc;
    use futures::future::join_all;
    use std::sync::atomic::AtomicUsize;

    struct CountingAggregator {
        calls: AtomicUsize,
        live: bool,
        delay: Duration,
    }

    impl CountingAggregator {
        fn new(live: bool) -> Self {
            Self::with_delay(live, Duration::from_millis(10))
        }

        fn with_delay(live: bool, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                live,
                delay,
            }
        }
    }

    #[async_trait]
    impl<'a> Aggregate for &'a CountingAggregator {
        async fn aggregate(&self) -> AggregationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.live {
                let spec = &default_indicators()[5];
                AggregationResult::from_indicators(
                    vec![Indicator::from_reading(spec, 52.0)],
                    Utc::now(),
                )
            } else {
                AggregationResult::no_data(Utc::now())
            }
        }
    }

    #[tokio::test]
    async fn test_live_result_is_cached_until_expiry() {
        let inner = CountingAggregator::new(true);
        let caching = CachingAggregator::new(&inner, Duration::from_millis(50));

        let first = caching.aggregate().await;
        let second = caching.aggregate().await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        tokio::time::sleep(Duration::from_millis(60)).await;
        caching.aggregate().await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_data_is_not_cached() {
        let inner = CountingAggregator::new(false);
        let caching = CachingAggregator::new(&inner, Duration::from_secs(60));

        caching.aggregate().await;
        caching.aggregate().await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_refresh() {
        let inner = CountingAggregator::new(true);
        let caching = CachingAggregator::new(&inner, Duration::from_secs(60));

        let (a, b, c) = tokio::join!(
            caching.aggregate(),
            caching.aggregate(),
            caching.aggregate()
        );
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_no_data_refresh() {
        let inner = CountingAggregator::new(false);
        let caching = CachingAggregator::new(&inner, Duration::from_secs(60));

        let (a, b, c) = tokio::join!(
            caching.aggregate(),
            caching.aggregate(),
            caching.aggregate()
        );
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.status, DataStatus::NoData);
        assert_eq!(a, b);
        assert_eq!(b, c);

        // Not cached, so the next request refreshes again
        caching.aggregate().await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_outage_latency_is_one_aggregation() {
        let delay = Duration::from_millis(200);
        let inner = CountingAggregator::with_delay(false, delay);
        let caching = CachingAggregator::new(&inner, Duration::from_secs(60));

        let started = std::time::Instant::now();
        let results = join_all((0..5).map(|_| caching.aggregate())).await;

        assert!(started.elapsed() < delay * 2, "took {:?}", started.elapsed());
        assert_eq!(results.len(), 5);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
