use warden_core::{schema::CollectionId, Policy, Result, Schema, View};

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

/// Read-through cache of immutable metadata snapshots.
///
/// Snapshots are never mutated: a reload or invalidation replaces the whole
/// entry, so readers holding an `Arc` keep a consistent view.
pub(crate) struct SnapshotCache<K, V: ?Sized> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    max_entries: usize,
    ttl: Duration,
}

struct Entry<V: ?Sized> {
    value: Arc<V>,

    /// Version of the source definition, when it has one.
    version: Option<u64>,
    loaded_at: Instant,
}

/// Snapshots shared by every request of a [`crate::Db`].
pub(crate) struct MetadataCache {
    pub(crate) schemas: SnapshotCache<String, Schema>,
    pub(crate) policies: SnapshotCache<(String, CollectionId), [Policy]>,
    pub(crate) views: SnapshotCache<(String, String), View>,
}

impl<K, V> SnapshotCache<K, V>
where
    K: Eq + Hash + Clone,
    V: ?Sized,
{
    pub(crate) fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries,
            ttl,
        }
    }

    fn enabled(&self) -> bool {
        self.max_entries > 0 && self.ttl > Duration::ZERO
    }

    pub(crate) async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled() {
            return None;
        }

        let now = Instant::now();
        let entries = self.entries.read().await;

        entries
            .get(key)
            .filter(|entry| now.duration_since(entry.loaded_at) < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub(crate) async fn put(&self, key: K, value: Arc<V>, version: Option<u64>) {
        if !self.enabled() {
            return;
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| now.duration_since(entry.loaded_at) < self.ttl);

        // A slow load must not replace a newer snapshot loaded concurrently.
        if let Some(existing) = entries.get(&key) {
            if let (Some(current), Some(version)) = (existing.version, version) {
                if current > version {
                    return;
                }
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                version,
                loaded_at: now,
            },
        );

        while entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.loaded_at)
                .map(|(key, _)| key.clone());

            match oldest {
                Some(key) => entries.remove(&key),
                None => break,
            };
        }
    }

    /// Returns the cached snapshot or loads and caches it. Misses (`None`)
    /// are not cached.
    pub(crate) async fn get_or_try_load<F, Fut>(&self, key: K, load: F) -> Result<Option<Arc<V>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<(Arc<V>, Option<u64>)>>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(Some(value));
        }

        let Some((value, version)) = load().await? else {
            return Ok(None);
        };

        self.put(key, value.clone(), version).await;
        Ok(Some(value))
    }

    pub(crate) async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub(crate) async fn invalidate_where(&self, f: impl Fn(&K) -> bool) {
        self.entries.write().await.retain(|key, _| !f(key));
    }
}

impl MetadataCache {
    pub(crate) fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            schemas: SnapshotCache::new(max_entries, ttl),
            policies: SnapshotCache::new(max_entries, ttl),
            views: SnapshotCache::new(max_entries, ttl),
        }
    }
}
