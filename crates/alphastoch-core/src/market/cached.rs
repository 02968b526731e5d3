use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{PriceSource, SourceError};
use crate::cache::{CacheMode, CacheStore, Clock};
use crate::{MarketSnapshot, Symbol};

/// Snapshot plus whether it was served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub snapshot: MarketSnapshot,
    pub cache_hit: bool,
}

/// Expiring snapshot cache wrapped around any [`PriceSource`].
///
/// Entries are keyed by symbol. Failures are never cached.
#[derive(Debug, Clone)]
pub struct CachedPriceSource<S> {
    inner: S,
    store: CacheStore<MarketSnapshot>,
    mode: CacheMode,
}

impl<S: PriceSource> CachedPriceSource<S> {
    /// Wrap `inner` with the default 60 second TTL.
    pub fn new(inner: S) -> Self {
        Self::with_store(inner, CacheStore::with_default_ttl())
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self::with_store(inner, CacheStore::new(ttl))
    }

    pub fn with_clock(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(inner, CacheStore::with_clock(ttl, clock))
    }

    pub fn with_store(inner: S, store: CacheStore<MarketSnapshot>) -> Self {
        Self {
            inner,
            store,
            mode: CacheMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn store(&self) -> &CacheStore<MarketSnapshot> {
        &self.store
    }

    /// Resolve a snapshot, reporting whether the cache answered.
    ///
    /// `Refresh` skips the read but stores the fresh value; `Bypass` neither
    /// reads nor writes.
    pub async fn lookup(&self, symbol: &Symbol) -> Result<CacheLookup, SourceError> {
        let key = symbol.as_str();

        if self.mode == CacheMode::Use {
            if let Some(snapshot) = self.store.get(key).await {
                debug!(symbol = key, "snapshot cache hit");
                return Ok(CacheLookup {
                    snapshot,
                    cache_hit: true,
                });
            }
        }

        let snapshot = self.inner.snapshot(symbol).await?;
        if self.mode != CacheMode::Bypass {
            self.store
                .put(key.to_string(), snapshot.clone(), None)
                .await;
        }
        debug!(symbol = key, source = self.inner.name(), "snapshot cache miss");

        Ok(CacheLookup {
            snapshot,
            cache_hit: false,
        })
    }
}

impl<S: PriceSource> PriceSource for CachedPriceSource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.lookup(symbol).await.map(|lookup| lookup.snapshot) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::UtcDateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn snapshot<'a>(
            &'a self,
            symbol: &'a Symbol,
        ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>>
        {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move {
                MarketSnapshot::new(symbol.clone(), 100.0 * call as f64, 0.0, UtcDateTime::now(), 1)
                    .map_err(|e| SourceError::internal(e.to_string()))
            })
        }
    }

    #[derive(Debug, Default)]
    struct FailingSource {
        calls: AtomicUsize,
    }

    impl PriceSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn snapshot<'a>(
            &'a self,
            _symbol: &'a Symbol,
        ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>>
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(SourceError::unavailable("down")) })
        }
    }

    fn btc() -> Symbol {
        Symbol::parse("BTC-USD").expect("valid symbol")
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_is_a_hit() {
        let clock = Arc::new(ManualClock::new());
        let cached =
            CachedPriceSource::with_clock(CountingSource::default(), Duration::from_secs(60), clock);

        let first = cached.lookup(&btc()).await.expect("first");
        let second = cached.lookup(&btc()).await.expect("second");

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.snapshot, second.snapshot);
        assert_eq!(cached.inner().calls(), 1);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cached = CachedPriceSource::with_clock(
            CountingSource::default(),
            Duration::from_secs(60),
            clock.clone(),
        );

        cached.lookup(&btc()).await.expect("prime");
        clock.advance(Duration::from_secs(60));
        let after = cached.lookup(&btc()).await.expect("refetch");

        assert!(!after.cache_hit);
        assert_eq!(after.snapshot.current_price, 200.0);
        assert_eq!(cached.inner().calls(), 2);
    }

    #[tokio::test]
    async fn refresh_mode_skips_read_but_stores() {
        let cached = CachedPriceSource::new(CountingSource::default()).with_mode(CacheMode::Refresh);

        cached.lookup(&btc()).await.expect("first");
        let second = cached.lookup(&btc()).await.expect("second");

        assert!(!second.cache_hit);
        assert_eq!(cached.inner().calls(), 2);
        assert_eq!(cached.store().len().await, 1);
    }

    #[tokio::test]
    async fn bypass_mode_never_touches_store() {
        let cached = CachedPriceSource::new(CountingSource::default()).with_mode(CacheMode::Bypass);

        cached.lookup(&btc()).await.expect("first");
        cached.lookup(&btc()).await.expect("second");

        assert_eq!(cached.inner().calls(), 2);
        assert!(cached.store().is_empty().await);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedPriceSource::new(FailingSource::default());

        assert!(cached.lookup(&btc()).await.is_err());
        assert!(cached.lookup(&btc()).await.is_err());

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
        assert!(cached.store().is_empty().await);
    }
}
