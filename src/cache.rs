//! Time-to-live cache for computed analysis results.
//!
//! The cache is an ordinary value owned by the caller and shared through an
//! `Arc`; nothing in the crate holds one globally. Entries expire a fixed
//! TTL after insertion and are evicted lazily: a read drops its own expired
//! entry, and every write sweeps all expired entries first. Keys carrying an
//! old time bucket are therefore reclaimed without an explicit
//! [`ResultCache::purge_expired`].

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Identity of a cached computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// What was analysed (a metric or entity identifier).
    pub subject: String,
    /// Canonical rendering of the parameters the result depends on.
    pub parameters: String,
    /// Time bucket the result belongs to.
    pub bucket: i64,
}

impl CacheKey {
    pub fn new(subject: impl Into<String>, parameters: impl Into<String>, bucket: i64) -> Self {
        Self {
            subject: subject.into(),
            parameters: parameters.into(),
            bucket,
        }
    }

    /// Key whose bucket is the index of the `width`-long window containing `at`.
    ///
    /// Widths under one second are treated as one second.
    pub fn bucketed(
        subject: impl Into<String>,
        parameters: impl Into<String>,
        at: DateTime<Utc>,
        width: Duration,
    ) -> Self {
        let width = i64::try_from(width.as_secs()).unwrap_or(i64::MAX).max(1);
        Self::new(subject, parameters, at.timestamp().div_euclid(width))
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    inserted_at: Instant,
}

#[derive(Debug)]
struct CacheState<K, V> {
    store: HashMap<K, Entry<V>>,
    hits: usize,
    misses: usize,
}

/// Thread-safe TTL cache publishing values as `Arc<V>`.
///
/// A value becomes visible only once fully built, since it is moved into
/// the map under the lock. Concurrent misses on the same key may each
/// compute the value; the last insert wins.
#[derive(Debug)]
pub struct ResultCache<V, K = CacheKey> {
    ttl: Duration,
    state: Mutex<CacheState<K, V>>,
}

impl<V, K: Eq + Hash> ResultCache<V, K> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState {
                store: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        // Entries are replaced whole, so a panic elsewhere cannot leave one half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }

    /// Live value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.get_at(key, Instant::now())
    }

    /// Like [`get`](Self::get), judging expiry as of `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<Arc<V>> {
        let mut st = self.lock();
        let live = match st.store.get(key) {
            Some(entry) if !self.is_expired(entry, now) => Some(Arc::clone(&entry.value)),
            _ => None,
        };
        if live.is_none() && st.store.remove(key).is_some() {
            tracing::trace!("evicted expired cache entry");
        }
        match live {
            Some(value) => {
                st.hits += 1;
                tracing::trace!("cache hit");
                Some(value)
            }
            None => {
                st.misses += 1;
                tracing::trace!("cache miss");
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        self.insert_at(key, value, Instant::now())
    }

    /// Like [`insert`](Self::insert), stamping the entry with `now`.
    ///
    /// Entries expired as of `now` are evicted before the new one is stored.
    pub fn insert_at(&self, key: K, value: V, now: Instant) -> Arc<V> {
        let value = Arc::new(value);
        let mut st = self.lock();
        self.sweep(&mut st, now);
        st.store.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                inserted_at: now,
            },
        );
        value
    }

    /// Cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held. Errors are returned and
    /// nothing is cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        Ok(self.insert(key, value))
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut st = self.lock();
        self.sweep(&mut st, now)
    }

    fn sweep(&self, st: &mut CacheState<K, V>, now: Instant) -> usize {
        let before = st.store.len();
        st.store.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before - st.store.len();
        if removed > 0 {
            tracing::trace!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().store.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let st = self.lock();
        CacheStats {
            hits: st.hits,
            misses: st.misses,
            entries: st.store.len(),
        }
    }
}
