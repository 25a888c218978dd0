//! Cache-aware query execution

use crate::bridge;
use crate::cache::{CacheStore, MemoryCacheStore};
use crate::error::QueryError;
use crate::source::SourceRegistry;
use crate::types::{CompiledQuery, ExecutionResult, NormalizedItem};
use crate::utils::epoch_secs;
use std::time::Instant;

/// Executes compiled queries against the registered content sources,
/// consulting the cache store first. Nothing thrown by an adapter crosses
/// this boundary; every failure comes back as result data.
pub struct Executor {
    registry: SourceRegistry,
    cache: Box<dyn CacheStore>,
    caching_enabled: bool,
}

impl Executor {
    pub fn new(registry: SourceRegistry) -> Self {
        Self::with_cache(registry, Box::new(MemoryCacheStore::new()))
    }

    pub fn with_cache(registry: SourceRegistry, cache: Box<dyn CacheStore>) -> Self {
        Self {
            registry,
            cache,
            caching_enabled: true,
        }
    }

    /// Global switch; the per-query `cache` attribute is honored only
    /// when this is on.
    pub fn set_caching_enabled(&mut self, enabled: bool) {
        self.caching_enabled = enabled;
    }

    pub fn registry_mut(&mut self) -> &mut SourceRegistry {
        &mut self.registry
    }

    pub fn execute(&mut self, query: &CompiledQuery) -> ExecutionResult {
        let start = Instant::now();

        let cache_wanted = self.caching_enabled
            && query
                .attributes
                .get("cache")
                .map(|v| v.is_truthy())
                .unwrap_or(true);

        if cache_wanted {
            if let Some(items) = self.cache_lookup(&query.cache_key) {
                log::debug!("Cache hit for {}", query.cache_key);
                return ExecutionResult {
                    success: true,
                    items,
                    cached: true,
                    elapsed_ms: elapsed_ms(start),
                    error: None,
                };
            }
        }

        let source_name = query.str_attr("cms").map(str::to_string);
        let source = match self.registry.resolve(source_name.as_deref()) {
            Some(source) => source,
            None => {
                log::warn!(
                    "No content source resolvable (requested: {:?})",
                    source_name
                );
                return ExecutionResult::failure(
                    QueryError::NoContentSource.to_string(),
                    elapsed_ms(start),
                );
            }
        };

        if !source.is_booted() {
            if let Err(e) = source.boot() {
                return ExecutionResult::failure(e.to_string(), elapsed_ms(start));
            }
        }

        let kind = source.kind().to_string();
        let records = match source.query(&query.attributes) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Content source '{}' failed: {}", kind, e);
                return ExecutionResult::failure(e.to_string(), elapsed_ms(start));
            }
        };

        let items: Vec<NormalizedItem> = records
            .iter()
            .map(|record| bridge::normalize_item(record, &kind))
            .collect();

        if cache_wanted {
            self.cache_store(query, &items);
        }

        ExecutionResult {
            success: true,
            items,
            cached: false,
            elapsed_ms: elapsed_ms(start),
            error: None,
        }
    }

    /// Live-entry lookup. A corrupt payload is treated as a miss so the
    /// next store overwrites it.
    fn cache_lookup(&self, key: &str) -> Option<Vec<NormalizedItem>> {
        let entry = self.cache.get(key)?;
        if entry.is_expired(epoch_secs()) {
            return None;
        }
        match serde_json::from_str(&entry.payload) {
            Ok(items) => {
                self.cache.touch_hit(key);
                Some(items)
            }
            Err(e) => {
                log::warn!("Discarding corrupt cache payload for {}: {}", key, e);
                None
            }
        }
    }

    fn cache_store(&self, query: &CompiledQuery, items: &[NormalizedItem]) {
        let payload = match serde_json::to_string(items) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Failed to serialize cache payload: {}", e);
                return;
            }
        };
        let ttl = query.int_attr("cache_ttl", 0);
        let expires_at = if ttl > 0 {
            Some(epoch_secs() + ttl as u64)
        } else {
            None
        };
        self.cache.put(&query.cache_key, &payload, expires_at);
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::error::{QueryError, Result};
    use crate::source::{ContentSource, RawRecord};
    use crate::types::{RuntimeContext, Value};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubSource {
        booted: bool,
        calls: Arc<AtomicUsize>,
        records: Vec<RawRecord>,
        fail: bool,
    }

    impl StubSource {
        fn with_items(count: usize, calls: Arc<AtomicUsize>) -> Self {
            let records = (0..count)
                .map(|i| {
                    json!({
                        "title": format!("Post {}", i + 1),
                        "excerpt": "An excerpt",
                        "permalink": format!("https://example.test/{}", i + 1),
                        "date": "2024-01-15",
                    })
                })
                .collect();
            Self {
                booted: false,
                calls,
                records,
                fail: false,
            }
        }
    }

    impl ContentSource for StubSource {
        fn kind(&self) -> &str {
            "rest"
        }

        fn is_booted(&self) -> bool {
            self.booted
        }

        fn boot(&mut self) -> Result<()> {
            self.booted = true;
            Ok(())
        }

        fn query(&self, _attributes: &HashMap<String, Value>) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(QueryError::adapter("rest", "backend unavailable"));
            }
            Ok(self.records.clone())
        }
    }

    fn executor_with_stub(count: usize, calls: Arc<AtomicUsize>) -> Executor {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = SourceRegistry::new();
        registry.register("rest", Box::new(StubSource::with_items(count, calls)));
        Executor::new(registry)
    }

    fn compile(directive: &str) -> crate::types::CompiledQuery {
        Compiler::new().compile(directive, &RuntimeContext::new())
    }

    #[test]
    fn test_miss_then_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(2, calls.clone());
        let query = compile("type=post limit=2");

        let first = executor.execute(&query);
        assert!(first.success);
        assert!(!first.cached);
        assert_eq!(first.items.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = executor.execute(&query);
        assert!(second.success);
        assert!(second.cached);
        assert_eq!(second.items, first.items);
        // Cache hit never touches the adapter
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_false_bypasses_store() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(1, calls.clone());
        let query = compile("type=post cache=false");

        executor.execute(&query);
        executor.execute(&query);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_global_cache_disable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(1, calls.clone());
        executor.set_caching_enabled(false);
        let query = compile("type=post");

        executor.execute(&query);
        executor.execute(&query);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_seeded_cache_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = MemoryCacheStore::new();
        let query = compile("type=post");

        let seeded = vec![NormalizedItem {
            title: "Seeded".to_string(),
            ..NormalizedItem::default()
        }];
        cache.put(
            &query.cache_key,
            &serde_json::to_string(&seeded).unwrap(),
            None,
        );

        let mut registry = SourceRegistry::new();
        registry.register("rest", Box::new(StubSource::with_items(3, calls.clone())));
        let mut executor = Executor::with_cache(registry, Box::new(cache));

        let result = executor.execute(&query);
        assert!(result.cached);
        assert_eq!(result.items, seeded);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_source_is_failure_data() {
        let mut executor = Executor::new(SourceRegistry::new());
        let result = executor.execute(&compile("type=post"));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("no content source"));
        assert_eq!(
            result.error.as_deref(),
            Some(QueryError::NoContentSource.to_string().as_str())
        );
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_unknown_named_source_is_failure_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(1, calls);
        let result = executor.execute(&compile("type=post cms=missing"));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("no content source"));
    }

    #[test]
    fn test_adapter_error_caught() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = SourceRegistry::new();
        let mut source = StubSource::with_items(0, calls);
        source.fail = true;
        registry.register("rest", Box::new(source));
        let mut executor = Executor::new(registry);

        let result = executor.execute(&compile("type=post"));
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("backend unavailable"));
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_boot_happens_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(1, calls);
        let query = compile("type=post cache=false");
        executor.execute(&query);
        let booted = executor
            .registry_mut()
            .resolve(None)
            .map(|s| s.is_booted())
            .unwrap_or(false);
        assert!(booted);
    }

    #[test]
    fn test_corrupt_payload_treated_as_miss() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = MemoryCacheStore::new();
        let query = compile("type=post");
        cache.put(&query.cache_key, "not json", None);

        let mut registry = SourceRegistry::new();
        registry.register("rest", Box::new(StubSource::with_items(1, calls.clone())));
        let mut executor = Executor::with_cache(registry, Box::new(cache));

        let result = executor.execute(&query);
        assert!(result.success);
        assert!(!result.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_compile_errors_do_not_block_execution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut executor = executor_with_stub(1, calls);
        let query = compile("type=post limit=999 foo=bar");
        assert!(!query.errors.is_empty());
        let result = executor.execute(&query);
        assert!(result.success);
    }
}
