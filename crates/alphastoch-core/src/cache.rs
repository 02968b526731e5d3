//! In-memory key → (value, expiry) cache with a pluggable clock.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Defines the behavior of the cache for a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, fetch upstream and write the result to the cache.
    #[default]
    Use,
    /// Always fetch upstream, bypassing any cached entry,
    /// and write the new result to the cache.
    Refresh,
    /// Always fetch upstream and do not read from or write to the cache.
    Bypass,
}

/// Monotonic time source used to stamp and expire cache entries.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.origin + *offset
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> CacheInner<V> {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str, now: Instant) -> Option<V> {
        self.map.get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, value: V, now: Instant, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = now + ttl;
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self, now: Instant) {
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe expiring cache shared by clones.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> CacheStore<V> {
    /// Create a cache with a default TTL on the system clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache driven by `clock`.
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
            clock,
        }
    }

    /// Create a cache with a default TTL of 60 seconds.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(60))
    }

    /// Create a disabled cache (every lookup misses).
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Get the cached value for `key` if it exists and hasn't expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.inner.read().await;
        store.get(key, self.clock.now())
    }

    /// Put a value into the cache.
    ///
    /// If `ttl_override` is provided, it is used instead of the default TTL.
    /// No-op when the cache is disabled.
    pub async fn put(&self, key: String, value: V, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;

        if store.default_ttl == Duration::ZERO {
            return;
        }

        store.put(key, value, self.clock.now(), ttl_override);
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired(self.clock.now());
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.default_ttl == Duration::ZERO
    }
}
