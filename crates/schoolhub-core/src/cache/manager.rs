use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use super::CacheKey;

/// Default time before a cached value is considered stale.
pub const DEFAULT_STALE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Negative ages come from clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_older_than(&self, max_age: Duration) -> bool {
        Utc::now() - self.cached_at > max_age
    }
}

/// Where a read's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Fetched by this call
    Network,
    /// Served from a fresh cache entry, or from a load another caller finished
    Cache,
}

struct Entry {
    cached: CachedData<Value>,
    invalidated: bool,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Entry>,
    /// Per-key load locks, giving at most one load in flight per key.
    /// Removed again once the last holder is done.
    locks: HashMap<CacheKey, Arc<AsyncMutex<()>>>,
    /// Bumped when a key with a load in flight is invalidated, so that load
    /// lands stale
    generations: HashMap<CacheKey, u64>,
}

impl CacheState {
    /// Flag the entry stale and, while a load is in flight, bump its generation.
    /// Returns whether a cached entry was hit.
    fn mark_stale(&mut self, key: &CacheKey) -> bool {
        if self.locks.contains_key(key) {
            *self.generations.entry(key.clone()).or_insert(0) += 1;
        }
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }
}

/// In-memory read cache keyed by `CacheKey`.
///
/// Values are raw JSON as returned by the API; typing happens at the
/// resource layer. Last store wins.
pub struct QueryCache {
    state: Mutex<CacheState>,
    stale_after: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_stale_after(Duration::minutes(DEFAULT_STALE_MINUTES))
    }

    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            stale_after,
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave the maps half-updated
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Value for `key` if present, not invalidated and within the stale time
    pub fn get_fresh(&self, key: &CacheKey) -> Option<Value> {
        let state = self.state();
        state.entries.get(key).and_then(|entry| {
            if entry.invalidated || entry.cached.is_older_than(self.stale_after) {
                None
            } else {
                Some(entry.cached.data.clone())
            }
        })
    }

    /// Cached entry regardless of freshness
    pub fn peek(&self, key: &CacheKey) -> Option<CachedData<Value>> {
        self.state().entries.get(key).map(|e| e.cached.clone())
    }

    pub fn is_fresh(&self, key: &CacheKey) -> bool {
        self.get_fresh(key).is_some()
    }

    /// Store a value directly, as if it had just been fetched
    pub fn set(&self, key: CacheKey, value: Value) {
        self.state().entries.insert(
            key,
            Entry {
                cached: CachedData::new(value),
                invalidated: false,
            },
        );
    }

    fn key_lock(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
        self.state()
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn generation(&self, key: &CacheKey) -> u64 {
        self.state().generations.get(key).copied().unwrap_or(0)
    }

    fn store(&self, key: &CacheKey, value: Value, generation: u64) {
        let mut state = self.state();
        let current = state.generations.get(key).copied().unwrap_or(0);
        let invalidated = current != generation;
        if invalidated {
            debug!(key = %key, "Key invalidated during load, storing as stale");
        }
        state.entries.insert(
            key.clone(),
            Entry {
                cached: CachedData::new(value),
                invalidated,
            },
        );
    }

    /// Return the fresh value for `key`, or run `loader` and cache its result.
    ///
    /// Concurrent calls for the same key wait for the first load and then
    /// reuse its value instead of loading again. A failed load caches nothing.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &CacheKey, loader: F) -> Result<(Value, CacheSource), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get_fresh(key) {
            debug!(key = %key, "Cache hit");
            return Ok((value, CacheSource::Cache));
        }

        let lock = self.key_lock(key);
        let result = {
            let _guard = lock.lock().await;

            // Another caller may have finished the load while we waited
            if let Some(value) = self.get_fresh(key) {
                debug!(key = %key, "Cache hit after waiting for in-flight load");
                Ok((value, CacheSource::Cache))
            } else {
                let generation = self.generation(key);
                debug!(key = %key, "Cache miss, loading");
                match loader().await {
                    Ok(value) => {
                        self.store(key, value.clone(), generation);
                        Ok((value, CacheSource::Network))
                    }
                    Err(e) => Err(e),
                }
            }
        };
        self.release(key, lock);
        result
    }

    /// Forget the key's lock and generation once nobody else holds the lock
    fn release(&self, key: &CacheKey, lock: Arc<AsyncMutex<()>>) {
        let mut state = self.state();
        let ours = matches!(state.locks.get(key), Some(held) if Arc::ptr_eq(held, &lock));
        // One reference in the map, one here
        if ours && Arc::strong_count(&lock) == 2 {
            state.locks.remove(key);
            state.generations.remove(key);
        }
    }

    /// Mark exactly these keys stale. Returns how many cached entries were hit.
    pub fn invalidate(&self, keys: &[CacheKey]) -> usize {
        let mut state = self.state();
        let mut hit = 0;
        for key in keys {
            if state.mark_stale(key) {
                hit += 1;
            }
        }
        debug!(keys = keys.len(), hit, "Invalidated cache keys");
        hit
    }

    /// Mark every key under any of `prefixes` stale, the prefix itself included.
    pub fn invalidate_prefixes(&self, prefixes: &[CacheKey]) -> usize {
        let mut state = self.state();
        let matching: HashSet<CacheKey> = state
            .entries
            .keys()
            .chain(state.locks.keys())
            .filter(|k| prefixes.iter().any(|p| k.starts_with(p)))
            .cloned()
            .collect();
        let mut hit = 0;
        for key in &matching {
            if state.mark_stale(key) {
                hit += 1;
            }
        }
        debug!(prefixes = prefixes.len(), hit, "Invalidated cache key prefixes");
        hit
    }

    /// Drop every entry. In-flight loads still finish but land stale.
    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        let in_flight: Vec<CacheKey> = state.locks.keys().cloned().collect();
        state.generations.retain(|k, _| in_flight.contains(k));
        for key in in_flight {
            *state.generations.entry(key).or_insert(0) += 1;
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> (usize, usize) {
        let state = self.state();
        (state.locks.len(), state.generations.len())
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Age of each cached entry, for status display
    pub fn ages(&self) -> Vec<(CacheKey, String)> {
        let mut ages: Vec<(CacheKey, String)> = self
            .state()
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.cached.age_display()))
            .collect();
        ages.sort_by_key(|(k, _)| k.to_string());
        ages
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(root: &str) -> CacheKey {
        CacheKey::new(root)
    }

    async fn load(cache: &QueryCache, k: &CacheKey, calls: &AtomicUsize, value: i64) -> (Value, CacheSource) {
        cache
            .get_or_fetch(k, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Value::from(value))
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_hours() {
        let mut cached = CachedData::new(1);
        cached.cached_at = Utc::now() - Duration::minutes(125);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");
    }

    #[tokio::test]
    async fn test_second_read_served_from_cache() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let k = key("students");

        assert_eq!(load(&cache, &k, &calls, 1).await.1, CacheSource::Network);
        let (value, source) = load(&cache, &k, &calls, 2).await;
        assert_eq!(source, CacheSource::Cache);
        assert_eq!(value, Value::from(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let k = key("announcements");

        load(&cache, &k, &calls, 1).await;
        assert_eq!(cache.invalidate(&[k.clone()]), 1);
        assert!(!cache.is_fresh(&k));
        assert!(cache.peek(&k).is_some());

        let (value, source) = load(&cache, &k, &calls, 2).await;
        assert_eq!(source, CacheSource::Network);
        assert_eq!(value, Value::from(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_exact_match() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let list = key("students");
        let detail = key("students").with(3);

        load(&cache, &list, &calls, 1).await;
        load(&cache, &detail, &calls, 2).await;
        cache.invalidate(&[list.clone()]);

        assert!(!cache.is_fresh(&list));
        assert!(cache.is_fresh(&detail));
    }

    #[tokio::test]
    async fn test_stale_entry_refetched() {
        let cache = QueryCache::with_stale_after(Duration::zero());
        let calls = AtomicUsize::new(0);
        let k = key("sections");

        load(&cache, &k, &calls, 1).await;
        std::thread::sleep(std::time::Duration::from_millis(2));
        load(&cache, &k, &calls, 1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_caches_nothing() {
        let cache = QueryCache::new();
        let k = key("teachers");
        let result = cache
            .get_or_fetch(&k, || async { Err::<Value, _>("boom".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.peek(&k).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let k = key("gradeLevels");
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let calls_ref = &calls;
        let first = cache.get_or_fetch(&k, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            release_rx.await.ok();
            Ok::<_, String>(Value::from("loaded"))
        });
        let second = async {
            // Let the first load take the key lock before joining
            tokio::task::yield_now().await;
            let waiting = load(&cache, &k, &calls, 99);
            let _ = release_tx.send(());
            waiting.await
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap().1, CacheSource::Network);
        assert_eq!(second, (Value::from("loaded"), CacheSource::Cache));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_during_load_lands_stale() {
        let cache = QueryCache::new();
        let k = key("messages");

        let (value, _) = cache
            .get_or_fetch(&k, || async {
                cache.invalidate(&[k.clone()]);
                Ok::<_, String>(Value::from(1))
            })
            .await
            .unwrap();
        assert_eq!(value, Value::from(1));
        assert!(cache.peek(&k).is_some());
        assert!(!cache.is_fresh(&k));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = QueryCache::new();
        cache.set(key("a"), Value::Null);
        cache.set(key("b"), Value::Null);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.ages().len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_prefix_covers_children() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let rosters = key("students").with("section");
        let section_2 = rosters.clone().with(2);
        let section_3 = rosters.clone().with(3);
        let list = key("students");

        load(&cache, &section_2, &calls, 1).await;
        load(&cache, &section_3, &calls, 2).await;
        load(&cache, &list, &calls, 3).await;

        assert_eq!(cache.invalidate_prefixes(&[rosters]), 2);
        assert!(!cache.is_fresh(&section_2));
        assert!(!cache.is_fresh(&section_3));
        assert!(cache.is_fresh(&list));
    }

    #[tokio::test]
    async fn test_prefix_invalidation_during_load_lands_stale() {
        let cache = QueryCache::new();
        let k = key("sections").with(4);

        cache
            .get_or_fetch(&k, || async {
                cache.invalidate_prefixes(&[key("sections")]);
                Ok::<_, String>(Value::from(1))
            })
            .await
            .unwrap();
        assert!(!cache.is_fresh(&k));
    }

    #[tokio::test]
    async fn test_bookkeeping_released_after_loads() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        for day in 1..=5 {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 10, day).unwrap();
            let k = key("attendance").with("section").with(2).with(date);
            load(&cache, &k, &calls, 1).await;
        }
        let _ = cache
            .get_or_fetch(&key("teachers"), || async { Err::<Value, _>("boom".to_string()) })
            .await;
        cache.invalidate(&[key("never-loaded"), key("attendance")]);

        assert_eq!(cache.len(), 5);
        assert_eq!(cache.tracked_keys(), (0, 0));
    }

    #[tokio::test]
    async fn test_clear_resets_bookkeeping_when_idle() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        load(&cache, &key("a"), &calls, 1).await;
        cache.invalidate(&[key("a")]);
        cache.clear();
        assert_eq!(cache.tracked_keys(), (0, 0));
    }

    #[tokio::test]
    async fn test_clear_during_load_lands_stale() {
        let cache = QueryCache::new();
        let k = key("subjects");

        cache
            .get_or_fetch(&k, || async {
                cache.clear();
                Ok::<_, String>(Value::from(1))
            })
            .await
            .unwrap();
        assert!(cache.peek(&k).is_some());
        assert!(!cache.is_fresh(&k));
        assert_eq!(cache.tracked_keys(), (0, 0));
    }
}
