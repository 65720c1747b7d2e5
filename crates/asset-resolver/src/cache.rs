//! Per-layer memoization of resolved assets.
//!
//! Scrubbing the time slider revisits the same (valid time, reference time)
//! pairs over and over; a hit skips the resolver entirely. The cache is
//! bounded and evicts least-recently-used entries.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use metrics::counter;
use serde::Serialize;
use tile_protocol::VirtualDataset;
use tokio::sync::RwLock;
use tracing::debug;

/// Separator joining key fields in [`ResolutionKey::cache_key`].
pub const KEY_SEPARATOR: char = '|';

/// Default number of entries kept per layer.
pub const DEFAULT_CAPACITY: usize = 256;

/// Identifies one resolution: valid time, reference time and render option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolutionKey {
    pub datetime_str: String,
    pub reference_dt_str: String,
    pub render_option: String,
}

impl ResolutionKey {
    pub fn new(
        datetime_str: impl Into<String>,
        reference_dt_str: impl Into<String>,
        render_option: impl Into<String>,
    ) -> Self {
        Self {
            datetime_str: datetime_str.into(),
            reference_dt_str: reference_dt_str.into(),
            render_option: render_option.into(),
        }
    }

    /// Flat string form, e.g. for logs.
    pub fn cache_key(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.datetime_str,
            self.reference_dt_str,
            self.render_option,
            sep = KEY_SEPARATOR
        )
    }
}

impl std::fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Bounded LRU cache from [`ResolutionKey`] to resolved asset.
///
/// Owned by exactly one displayed layer; dropped with it.
pub struct ResolutionCache {
    cache: Arc<RwLock<LruCache<ResolutionKey, VirtualDataset>>>,
    counters: Arc<CacheCounters>,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResolutionCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// Look up a resolved asset, refreshing its recency.
    pub async fn get(&self, key: &ResolutionKey) -> Option<VirtualDataset> {
        // LRU bookkeeping mutates on read
        let mut cache = self.cache.write().await;
        match cache.get(key) {
            Some(dataset) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                counter!("resolution_cache_hits_total").increment(1);
                debug!(key = %key, "Resolution cache hit");
                Some(dataset.clone())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                counter!("resolution_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Store a resolved asset. Last writer wins for an existing key.
    pub async fn put(&self, key: ResolutionKey, value: VirtualDataset) {
        let mut cache = self.cache.write().await;
        let inserted = key.clone();
        if let Some((displaced, _)) = cache.push(key, value) {
            if displaced != inserted {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %displaced, "Resolution cache evicted entry");
            }
        }
        self.counters.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Check presence without touching recency or statistics.
    pub async fn contains(&self, key: &ResolutionKey) -> bool {
        self.cache.read().await.contains(key)
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Drop every entry. Statistics are kept.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            inserts: self.counters.inserts.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: self.cache.read().await.len() as u64,
        }
    }
}
