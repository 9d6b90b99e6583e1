//! Response cache for conditional requests
//!
//! The client remembers, per [`RequestFingerprint`], the last `ETag` it saw
//! together with the payload that came with it. The next request for the same
//! fingerprint sends that `ETag` as `If-None-Match`; a `304` answer is then
//! served from here.
//!
//! Entries never expire and are never evicted. Whether clients share a store
//! is chosen at construction time through a [`StoreFactory`]:
//!
//! - [`GlobalStoreFactory`] - one store for the whole process
//! - [`IsolatedStoreFactory`] - a private store per client

use crate::models::RenderedAppSecret;
use moka::sync::Cache;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Cache key for a rendered-secrets request
///
/// Only the catalog app and the environment take part. The secret-name filter
/// does not, so filtered and unfiltered requests share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint {
    catalog_app_id: String,
    environment_id: String,
}

impl RequestFingerprint {
    /// Fingerprint a request for `catalog_app_id` in `environment_id`
    pub fn new(catalog_app_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            catalog_app_id: catalog_app_id.into(),
            environment_id: environment_id.into(),
        }
    }

    /// Catalog app id
    pub fn catalog_app_id(&self) -> &str {
        &self.catalog_app_id
    }

    /// Environment id
    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }
}

/// Last fresh response seen for a fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// `ETag` the host sent with the payload
    pub etag: String,
    /// Payload that came with `etag`
    pub secrets: Vec<RenderedAppSecret>,
}

/// Concurrent map from fingerprint to cached response
///
/// Implementations must replace entries atomically: a `get` racing a `set`
/// returns either the old or the new entry, never a mix of both.
pub trait ResponseStore: Send + Sync + fmt::Debug {
    /// Look up the cached response for `key`
    fn get(&self, key: &RequestFingerprint) -> Option<Arc<CachedResponse>>;

    /// Store `value` under `key`, replacing any previous entry
    fn set(&self, key: RequestFingerprint, value: Arc<CachedResponse>);

    /// Drop the entry for `key`
    fn remove(&self, key: &RequestFingerprint);
}

/// Unbounded in-memory store with no expiry
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Cache<RequestFingerprint, Arc<CachedResponse>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl ResponseStore for InMemoryStore {
    fn get(&self, key: &RequestFingerprint) -> Option<Arc<CachedResponse>> {
        self.entries.get(key)
    }

    fn set(&self, key: RequestFingerprint, value: Arc<CachedResponse>) {
        self.entries.insert(key, value);
    }

    fn remove(&self, key: &RequestFingerprint) {
        self.entries.invalidate(key);
    }
}

/// Supplies the store a client binds to at construction time
pub trait StoreFactory: Send + Sync + fmt::Debug {
    /// Return the store to use, or `None` if none is available
    fn store(&self) -> Option<Arc<dyn ResponseStore>>;
}

static GLOBAL_STORE: OnceLock<Arc<InMemoryStore>> = OnceLock::new();

/// Hands every client the same process-wide store
///
/// The store is created on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalStoreFactory;

impl StoreFactory for GlobalStoreFactory {
    fn store(&self) -> Option<Arc<dyn ResponseStore>> {
        let store = GLOBAL_STORE.get_or_init(|| Arc::new(InMemoryStore::new()));
        Some(store.clone())
    }
}

/// Hands every client its own fresh store
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatedStoreFactory;

impl StoreFactory for IsolatedStoreFactory {
    fn store(&self) -> Option<Arc<dyn ResponseStore>> {
        Some(Arc::new(InMemoryStore::new()))
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    inner: Arc<CacheStatsInner>,
}

#[derive(Debug, Default)]
struct CacheStatsInner {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
}

impl CacheStats {
    /// Create new cache statistics
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(CacheStatsInner::default()),
        }
    }

    /// Responses served from the cache after a `304`
    pub fn hits(&self) -> u64 {
        self.inner.hits.load(Ordering::Relaxed)
    }

    /// Requests sent without a validator because nothing was cached
    pub fn misses(&self) -> u64 {
        self.inner.misses.load(Ordering::Relaxed)
    }

    /// Fresh responses written to the cache
    pub fn insertions(&self) -> u64 {
        self.inner.insertions.load(Ordering::Relaxed)
    }

    /// Get the hit rate as a percentage (0.0-100.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        self.inner.hits.store(0, Ordering::Relaxed);
        self.inner.misses.store(0, Ordering::Relaxed);
        self.inner.insertions.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        let _ = self.inner.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        let _ = self.inner.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insertion(&self) {
        let _ = self.inner.insertions.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueType;
    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    fn response(etag: &str, value: &str) -> Arc<CachedResponse> {
        Arc::new(CachedResponse {
            etag: etag.to_string(),
            secrets: vec![RenderedAppSecret::new("K", "S", value, ValueType::String)],
        })
    }

    #[test]
    fn test_store_get_set_remove() {
        let store = InMemoryStore::new();
        let key = RequestFingerprint::new("app1", "env1");
        assert!(store.get(&key).is_none());

        store.set(key.clone(), response("e1", "V1"));
        assert_eq!(store.get(&key).unwrap().etag, "e1");

        store.set(key.clone(), response("e2", "V2"));
        let entry = store.get(&key).unwrap();
        assert_eq!(entry.etag, "e2");
        assert_eq!(entry.secrets, response("e2", "V2").secrets);

        store.remove(&key);
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let store = InMemoryStore::new();
        store.set(RequestFingerprint::new("app1", "env1"), response("a", "A"));
        store.set(RequestFingerprint::new("app1", "env2"), response("b", "B"));

        assert_eq!(store.get(&RequestFingerprint::new("app1", "env1")).unwrap().etag, "a");
        assert_eq!(store.get(&RequestFingerprint::new("app1", "env2")).unwrap().etag, "b");
        assert!(store.get(&RequestFingerprint::new("app2", "env1")).is_none());
    }

    #[test]
    fn test_global_factory_shares_store() {
        let a = GlobalStoreFactory.store().unwrap();
        let b = GlobalStoreFactory.store().unwrap();
        let key = RequestFingerprint::new("global-factory-test", "env");

        a.set(key.clone(), response("shared", "V"));
        assert_eq!(b.get(&key).unwrap().etag, "shared");
    }

    #[test]
    fn test_isolated_factory_separates_stores() {
        let a = IsolatedStoreFactory.store().unwrap();
        let b = IsolatedStoreFactory.store().unwrap();
        let key = RequestFingerprint::new("app", "env");

        a.set(key.clone(), response("private", "V"));
        assert!(a.get(&key).is_some());
        assert!(b.get(&key).is_none());
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let store = Arc::new(InMemoryStore::new());
        let key = RequestFingerprint::new("app", "env");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    for round in 0..200 {
                        let tag = format!("{}-{}", i, round);
                        store.set(key.clone(), response(&tag, &tag));
                        if let Some(entry) = store.get(&key) {
                            // ETag and payload were written together
                            assert_eq!(
                                entry.secrets[0].serialized_value.expose_secret(),
                                &entry.etag
                            );
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(store.get(&key).is_some());
    }

    #[test]
    fn test_cache_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_insertion();

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.insertions(), 1);
        assert_eq!(stats.hit_rate(), 66.66666666666666);

        stats.reset();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.insertions(), 0);
    }

    proptest! {
        #[test]
        fn fingerprint_equality_follows_components(
            app_a in "[a-z0-9]{1,8}",
            env_a in "[a-z0-9]{1,8}",
            app_b in "[a-z0-9]{1,8}",
            env_b in "[a-z0-9]{1,8}",
        ) {
            let a = RequestFingerprint::new(app_a.clone(), env_a.clone());
            let b = RequestFingerprint::new(app_b.clone(), env_b.clone());
            prop_assert_eq!(a == b, app_a == app_b && env_a == env_b);
        }
    }
}
