//! Bounded in-memory cache with per-entry expiry
//!
//! Wraps a `moka` cache: TinyLFU admission and frequency-aware eviction keep
//! hot keys resident through bursts of one-off queries, a weigher charges each
//! entry its cost units against the budget, and a per-entry expiry fixes the
//! TTL window at insertion time.

use moka::Expiry;
use moka::sync::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

/// A cached value with its cost and expiry.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub cost_units: u32,
    pub ttl: Duration,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache construction settings
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Upper bound on the sum of live entry costs
    pub max_cost: u64,
}

impl CacheConfig {
    pub fn new(max_cost: u64) -> Self {
        Self { max_cost }
    }

    /// Budget of `mb` mebibytes worth of cost units.
    pub fn from_megabytes(mb: u64) -> Self {
        Self::new(mb.saturating_mul(1024 * 1024))
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
    pub weighted_size: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Expiry fixed at create/update time; reads never extend it.
struct EntryExpiry;

impl<V> Expiry<String, Arc<CacheEntry<V>>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<CacheEntry<V>>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<CacheEntry<V>>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Concurrent, cost-bounded key/value store with TTL expiry.
///
/// All runtime operations are infallible and need no caller-side locking.
pub struct BoundedTtlCache<V> {
    inner: Cache<String, Arc<CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> BoundedTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Build a cache with the given budget. A zero budget is rejected.
    pub fn new(config: CacheConfig) -> Result<Self> {
        if config.max_cost == 0 {
            return Err(ConfigError::InvalidCacheBudget(config.max_cost));
        }

        let inner = Cache::builder()
            .max_capacity(config.max_cost)
            .weigher(|_key: &String, entry: &Arc<CacheEntry<V>>| entry.cost_units)
            .expire_after(EntryExpiry)
            .build();

        log::info!("Cache initialized with budget of {} cost units", config.max_cost);

        Ok(Self {
            inner,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Look up a live entry. Expired entries are dropped and reported as misses.
    pub fn get(&self, key: &str) -> Option<V> {
        let found = match self.inner.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                self.inner.invalidate(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert or replace with a cost of one unit.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_with_cost(key, value, ttl, 1);
    }

    /// Insert or replace, charging `cost` units against the budget.
    ///
    /// The admission policy may decline the entry under pressure; a declined
    /// entry is simply absent on the next lookup.
    pub fn set_with_cost(&self, key: impl Into<String>, value: V, ttl: Duration, cost: u32) {
        let entry = CacheEntry {
            value,
            cost_units: cost.max(1),
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.inner.insert(key.into(), Arc::new(entry));
    }

    pub fn delete(&self, key: &str) {
        self.inner.invalidate(key);
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Number of live entries after pending maintenance has run.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.inner.entry_count(),
            weighted_size: self.inner.weighted_size(),
        }
    }

    /// Flush moka's deferred admission and eviction work.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}
