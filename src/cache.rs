//! Cache store contract and the in-memory reference implementation

use crate::types::CacheEntry;
use crate::utils::epoch_secs;
use std::collections::HashMap;
use std::sync::Mutex;

/// Single-key-atomic cache store. Keys are opaque strings produced only
/// by the compiler. The store owns expiry and eviction; the executor
/// never deletes entries. No at-most-once-per-key guarantee exists:
/// concurrent misses race and the last write wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn put(&self, key: &str, payload: &str, expires_at: Option<u64>);
    fn touch_hit(&self, key: &str);
}

/// Reference store backed by one mutex-guarded map. Suitable for tests
/// and single-process deployments; persistent stores implement the same
/// trait externally.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, payload: &str, expires_at: Option<u64>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    key: key.to_string(),
                    payload: payload.to_string(),
                    expires_at,
                    hit_count: 0,
                    last_hit_at: None,
                },
            );
        }
    }

    fn touch_hit(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if let Some(entry) = entries.get_mut(key) {
                entry.hit_count += 1;
                entry.last_hit_at = Some(epoch_secs());
            }
        }
    }
}
