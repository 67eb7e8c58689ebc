// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded, idle-expiring cache of engines keyed by run identifier.
//!
//! Two independent bounds apply:
//! * **Capacity** - inserting beyond `capacity` distinct keys evicts the least
//!   recently used entry.
//! * **Idle timeout** - an entry not read or written for longer than
//!   `idle_timeout` is gone on the next lookup, whatever the cache size.
//!
//! Time is taken from `tokio::time::Instant`, so tests can drive expiry with a
//! paused clock.

use dashmap::DashMap;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::observability::messages::engine::{EngineEvicted, EvictionReason};
use crate::observability::messages::StructuredLog;

struct Entry<E> {
    value: Arc<E>,
    last_access: Instant,
    recency: u64,
}

struct Entries<E> {
    map: HashMap<String, Entry<E>>,
    clock: u64,
}

impl<E> Entries<E> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Outcome of [`EngineCache::get_or_try_insert_with`].
#[derive(Debug)]
pub enum CacheLookup<E> {
    /// The entry was already cached (possibly built by a concurrent caller).
    Hit(Arc<E>),
    /// The entry was built by this call and inserted.
    Built(Arc<E>),
}

impl<E> CacheLookup<E> {
    pub fn into_inner(self) -> Arc<E> {
        match self {
            CacheLookup::Hit(value) | CacheLookup::Built(value) => value,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

pub struct EngineCache<E> {
    capacity: usize,
    idle_timeout: Duration,
    entries: Mutex<Entries<E>>,
    gates: DashMap<String, Arc<Mutex<()>>>,
}

impl<E> EngineCache<E> {
    /// `capacity` is raised to at least one entry.
    pub fn new(capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            idle_timeout,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                clock: 0,
            }),
            gates: DashMap::new(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.idle_timeout())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Cached value for `run_id`, refreshing its last access. Expired entries are
    /// removed and reported as absent.
    pub async fn get(&self, run_id: &str) -> Option<Arc<E>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = match entries.map.get(run_id) {
            None => return None,
            Some(entry) => now.duration_since(entry.last_access) > self.idle_timeout,
        };
        if expired {
            entries.map.remove(run_id);
            EngineEvicted {
                run_id,
                reason: EvictionReason::Expired,
            }
            .log();
            return None;
        }

        let recency = entries.tick();
        let entry = entries.map.get_mut(run_id)?;
        entry.last_access = now;
        entry.recency = recency;
        Some(entry.value.clone())
    }

    /// Insert or replace the value for `run_id`, evicting as needed to stay within capacity.
    pub async fn put(&self, run_id: impl Into<String>, value: Arc<E>) {
        let run_id = run_id.into();
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        self.purge_locked(&mut entries, now);
        if !entries.map.contains_key(&run_id) {
            while entries.map.len() >= self.capacity {
                let oldest = entries
                    .map
                    .iter()
                    .min_by_key(|(_, entry)| entry.recency)
                    .map(|(key, _)| key.clone());
                let Some(oldest) = oldest else { break };
                entries.map.remove(&oldest);
                EngineEvicted {
                    run_id: &oldest,
                    reason: EvictionReason::Capacity,
                }
                .log();
            }
        }

        let recency = entries.tick();
        entries.map.insert(
            run_id,
            Entry {
                value,
                last_access: now,
                recency,
            },
        );
    }

    pub async fn remove(&self, run_id: &str) -> Option<Arc<E>> {
        self.entries
            .lock()
            .await
            .map
            .remove(run_id)
            .map(|entry| entry.value)
    }

    /// Number of entries, including any that expired but were not looked up since.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.purge_locked(&mut entries, Instant::now())
    }

    fn purge_locked(&self, entries: &mut Entries<E>, now: Instant) -> usize {
        let expired: Vec<String> = entries
            .map
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_access) > self.idle_timeout)
            .map(|(key, _)| key.clone())
            .collect();

        for run_id in &expired {
            entries.map.remove(run_id);
            EngineEvicted {
                run_id,
                reason: EvictionReason::Expired,
            }
            .log();
        }
        expired.len()
    }

    /// Return the cached value for `run_id`, or build, insert and return it.
    ///
    /// Concurrent callers missing on the same `run_id` are serialized on a per-key
    /// gate: the first one builds, the others find its result. A failed build
    /// inserts nothing and the next caller tries again.
    pub async fn get_or_try_insert_with<F, Fut, Err>(
        &self,
        run_id: &str,
        build: F,
    ) -> Result<CacheLookup<E>, Err>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<E, Err>>,
    {
        if let Some(value) = self.get(run_id).await {
            return Ok(CacheLookup::Hit(value));
        }

        let gate = self
            .gates
            .entry(run_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = gate.lock().await;
            match self.get(run_id).await {
                Some(value) => Ok(CacheLookup::Hit(value)),
                None => match build().await {
                    Ok(value) => {
                        let value = Arc::new(value);
                        self.put(run_id, value.clone()).await;
                        Ok(CacheLookup::Built(value))
                    }
                    Err(e) => Err(e),
                },
            }
        };

        // Only the map and this call hold the gate when nobody else is waiting.
        self.gates
            .remove_if(run_id, |_, gate| Arc::strong_count(gate) <= 2);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn cache(capacity: usize) -> EngineCache<String> {
        EngineCache::new(capacity, 12 * HOUR)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = cache(2);
        cache.put("run-1", Arc::new("engine".to_string())).await;

        assert_eq!(cache.get("run-1").await.as_deref().map(String::as_str), Some("engine"));
        assert!(cache.get("run-2").await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let cache = cache(1);
        cache.put("run-1", Arc::new("a".to_string())).await;
        cache.put("run-1", Arc::new("b".to_string())).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("run-1").await.unwrap().as_str(), "b");
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let cache = cache(3);
        for i in 0..10 {
            cache.put(format!("run-{i}"), Arc::new(i.to_string())).await;
            assert!(cache.len().await <= 3);
        }
        assert!(cache.get("run-9").await.is_some());
        assert!(cache.get("run-0").await.is_none());
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache = cache(2);
        cache.put("a", Arc::new("a".to_string())).await;
        cache.put("b", Arc::new("b".to_string())).await;
        cache.get("a").await;

        cache.put("c", Arc::new("c".to_string())).await;

        assert!(cache.get("a").await.is_some());
        assert!(cache.get("b").await.is_none());
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_entry_expires() {
        let cache = cache(5);
        cache.put("run-1", Arc::new("engine".to_string())).await;

        tokio::time::advance(11 * HOUR).await;
        assert!(cache.get("run-1").await.is_some());

        // The lookup above refreshed the entry.
        tokio::time::advance(11 * HOUR).await;
        assert!(cache.get("run-1").await.is_some());

        tokio::time::advance(12 * HOUR + Duration::from_secs(1)).await;
        assert!(cache.get("run-1").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = cache(5);
        cache.put("old", Arc::new("o".to_string())).await;
        tokio::time::advance(6 * HOUR).await;
        cache.put("new", Arc::new("n".to_string())).await;
        tokio::time::advance(7 * HOUR).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("new").await.is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = cache(2);
        cache.put("run-1", Arc::new("x".to_string())).await;

        assert!(cache.remove("run-1").await.is_some());
        assert!(cache.remove("run-1").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_builds_once() {
        let cache = cache(2);
        let builds = AtomicUsize::new(0);

        for _ in 0..3 {
            let lookup = cache
                .get_or_try_insert_with("run-1", || async {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("engine".to_string())
                })
                .await
                .unwrap();
            assert_eq!(lookup.into_inner().as_str(), "engine");
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_build_caches_nothing() {
        let cache = cache(2);

        let result = cache
            .get_or_try_insert_with("run-1", || async { Err::<String, _>("boom") })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.is_empty().await);

        let lookup = cache
            .get_or_try_insert_with("run-1", || async { Ok::<_, &str>("ok".to_string()) })
            .await
            .unwrap();
        assert!(!lookup.is_hit());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_build_once() {
        let cache = Arc::new(cache(4));
        let builds = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                let builds = builds.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_try_insert_with("run-1", || async move {
                            builds.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, String>("engine".to_string())
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut built = 0;
        for handle in handles {
            if !handle.await.unwrap().is_hit() {
                built += 1;
            }
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(built, 1);
        assert!(cache.gates.is_empty());
    }
}
