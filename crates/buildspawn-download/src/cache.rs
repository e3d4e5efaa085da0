use buildspawn_core::building::BuildingConstruction;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

struct CacheEntry {
    construction: Arc<BuildingConstruction>,
    hash: String,
    last_access: AtomicU64,
}

/// In-memory LRU of building constructions keyed by rdns, plus the set of
/// rdns currently being fetched.
///
/// Readers share the map; access stamps are atomics so `get` never takes the
/// write lock. Eviction happens under the write lock inside `put`.
pub struct BuildingCache {
    max_entries: usize,
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: AtomicU64,
    downloading: Mutex<HashSet<String>>,
    /// Signalled whenever an in-flight flag is cleared.
    fetch_done: Condvar,
}

impl BuildingCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            downloading: Mutex::new(HashSet::new()),
            fetch_done: Condvar::new(),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, rdns: &str) -> Option<Arc<BuildingConstruction>> {
        let guard = self.entries_read();
        let entry = guard.get(rdns)?;
        entry.last_access.store(self.tick(), Ordering::Relaxed);
        Some(entry.construction.clone())
    }

    /// Insert or replace. A new key at capacity evicts the least recently
    /// used entry first.
    pub fn put(
        &self,
        rdns: &str,
        construction: BuildingConstruction,
        hash: &str,
    ) -> Arc<BuildingConstruction> {
        let construction = Arc::new(construction);
        let mut guard = self.entries_write();
        if !guard.contains_key(rdns) && guard.len() >= self.max_entries {
            let victim = guard
                .iter()
                .min_by_key(|(_, e)| e.last_access.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                log::debug!("Evicting '{victim}' from building cache");
                guard.remove(&victim);
            }
        }
        guard.insert(
            rdns.to_string(),
            CacheEntry {
                construction: construction.clone(),
                hash: hash.to_string(),
                last_access: AtomicU64::new(self.tick()),
            },
        );
        construction
    }

    pub fn contains(&self, rdns: &str) -> bool {
        self.entries_read().contains_key(rdns)
    }

    pub fn hash_of(&self, rdns: &str) -> Option<String> {
        self.entries_read().get(rdns).map(|e| e.hash.clone())
    }

    pub fn remove(&self, rdns: &str) -> bool {
        self.entries_write().remove(rdns).is_some()
    }

    /// Drop the entry if its hash differs from `expected`. Returns true when
    /// something was removed.
    pub fn invalidate_if_hash_mismatch(&self, rdns: &str, expected: &str) -> bool {
        let mut guard = self.entries_write();
        match guard.get(rdns) {
            Some(entry) if entry.hash != expected => {
                log::info!(
                    "Cached '{rdns}' is stale (hash {} != {expected}), invalidating",
                    entry.hash
                );
                guard.remove(rdns);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_read().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&self) {
        self.entries_write().clear();
    }

    /// Claim `rdns` for fetching. False if it is already in flight.
    pub fn mark_downloading(&self, rdns: &str) -> bool {
        self.downloading_lock().insert(rdns.to_string())
    }

    pub fn clear_downloading(&self, rdns: &str) {
        self.downloading_lock().remove(rdns);
        self.fetch_done.notify_all();
    }

    /// Like `mark_downloading`, but if another thread holds the flag, block
    /// until it is cleared or `timeout` passes. False on timeout.
    pub fn wait_and_mark_downloading(&self, rdns: &str, timeout: Duration) -> bool {
        let guard = self.downloading_lock();
        let (mut guard, wait) = self
            .fetch_done
            .wait_timeout_while(guard, timeout, |set| set.contains(rdns))
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if wait.timed_out() {
            return false;
        }
        guard.insert(rdns.to_string())
    }

    pub fn is_downloading(&self, rdns: &str) -> bool {
        self.downloading_lock().contains(rdns)
    }

    pub fn downloading_count(&self) -> usize {
        self.downloading_lock().len()
    }

    fn entries_read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn entries_write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn downloading_lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.downloading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn empty() -> BuildingConstruction {
        BuildingConstruction::default()
    }

    #[test]
    fn test_lru_evicts_first_key() {
        let cache = BuildingCache::new(3);
        for key in ["a", "b", "c", "d"] {
            cache.put(key, empty(), "h");
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b") && cache.contains("c") && cache.contains("d"));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = BuildingCache::new(3);
        cache.put("a", empty(), "h");
        cache.put("b", empty(), "h");
        cache.put("c", empty(), "h");
        assert!(cache.get("a").is_some());
        cache.put("d", empty(), "h");
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let cache = BuildingCache::new(2);
        cache.put("a", empty(), "1");
        cache.put("b", empty(), "1");
        cache.put("a", empty(), "2");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hash_of("a").as_deref(), Some("2"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_hash_mismatch_invalidates() {
        let cache = BuildingCache::new(4);
        cache.put("a", empty(), "old");
        assert!(!cache.invalidate_if_hash_mismatch("a", "old"));
        assert!(cache.invalidate_if_hash_mismatch("a", "new"));
        assert!(!cache.contains("a"));
        assert!(!cache.invalidate_if_hash_mismatch("missing", "x"));
    }

    #[test]
    fn test_mark_downloading_once() {
        let cache = BuildingCache::new(4);
        assert!(cache.mark_downloading("a"));
        assert!(!cache.mark_downloading("a"));
        assert!(cache.is_downloading("a"));
        cache.clear_downloading("a");
        assert!(!cache.is_downloading("a"));
        assert!(cache.mark_downloading("a"));
    }

    #[test]
    fn test_wait_for_cleared_flag() {
        let cache = Arc::new(BuildingCache::new(4));
        assert!(cache.mark_downloading("a"));

        let waiter = {
            let cache = cache.clone();
            thread::spawn(move || cache.wait_and_mark_downloading("a", Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(50));
        cache.clear_downloading("a");

        assert!(waiter.join().expect("waiter"));
        assert!(cache.is_downloading("a"));
    }

    #[test]
    fn test_wait_times_out() {
        let cache = BuildingCache::new(4);
        assert!(cache.wait_and_mark_downloading("a", Duration::from_millis(10)));
        assert!(!cache.wait_and_mark_downloading("a", Duration::from_millis(20)));
        assert!(cache.is_downloading("a"));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(BuildingCache::new(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let key = format!("k{}", (t * 50 + i) % 16);
                        cache.put(&key, BuildingConstruction::default(), "h");
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker");
        }
        assert!(cache.len() <= 8);
    }
}
