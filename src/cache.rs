//! Bounded result cache with single-flight computation.
//!
//! ## Semantics
//!
//! - **Capacity**: least-recently-used eviction beyond `capacity` entries.
//! - **TTL**: entries past `ttl` are treated as misses on read and recomputed.
//! - **Single-flight**: concurrent callers for the same fingerprint observe at
//!   most one underlying computation; waiters pick up the freshly cached
//!   result once the first caller finishes.
//!
//! The compute path is infallible by contract: the judgment pipeline absorbs
//! upstream failures into a safe default result, so the cache never has to
//! reason about storing errors.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::fingerprint::Fingerprint;
use crate::types::VerificationResult;

/// Configuration for the result cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached results.
    pub capacity: usize,
    /// Time-to-live for a cached result.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl: Duration::from_secs(3600),
        }
    }
}

struct CacheEntry {
    result: Arc<VerificationResult>,
    inserted_at: Instant,
}

/// LRU cache of verification results keyed by request fingerprint.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<LruCache<Fingerprint, CacheEntry>>,
    inflight: Mutex<HashMap<Fingerprint, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResultCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            ttl: config.ttl,
            entries: Mutex::new(LruCache::new(capacity)),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry, promoting it to most-recently-used.
    ///
    /// Expired entries are dropped and reported as misses.
    pub fn lookup(&self, key: &Fingerprint) -> Option<Arc<VerificationResult>> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.result));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Return the cached result for `key`, computing and storing it on a miss.
    ///
    /// Per-key mutual exclusion around the compute: a second caller arriving
    /// for the same key while the first is in flight waits, then re-checks the
    /// cache and observes the first caller's result.
    pub async fn get_or_compute<F, Fut>(&self, key: Fingerprint, compute: F) -> Arc<VerificationResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VerificationResult>,
    {
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }

        let gate = {
            let mut inflight = self.inflight.lock();
            Arc::clone(
                inflight
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let _guard = gate.lock().await;

        // A caller that finished while we waited has already populated the
        // cache for this key.
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }

        let result = Arc::new(compute().await);
        self.entries.lock().put(
            key.clone(),
            CacheEntry {
                result: Arc::clone(&result),
                inserted_at: Instant::now(),
            },
        );
        self.inflight.lock().remove(&key);

        result
    }

    /// Number of cached results (expired entries included until read).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no results.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
