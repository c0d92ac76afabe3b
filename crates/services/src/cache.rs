//! Snapshot cache.
//!
//! Navigating away from a page and back should not refetch within the
//! TTL. Entries are keyed by the exact (collection, filter, view)
//! triple and outlive any single view handle.

use config::CacheConfig;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Exact identity of a derived view's inputs.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ViewKey {
    pub collection: String,
    /// `Filter::fingerprint()` of the query, empty for unfiltered.
    pub filter: String,
    /// Identifier of the bucketing specification / page view.
    pub spec: String,
}

impl ViewKey {
    pub fn new(
        collection: impl Into<String>,
        filter: impl Into<String>,
        spec: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            filter: filter.into(),
            spec: spec.into(),
        }
    }
}

#[derive(Clone)]
pub struct SnapshotCache<T> {
    inner: Cache<ViewKey, Arc<T>>,
}

impl<T: Send + Sync + 'static> SnapshotCache<T> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(Duration::from_secs(config.snapshot_ttl_secs))
                .build(),
        }
    }

    pub async fn get(&self, key: &ViewKey) -> Option<Arc<T>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: ViewKey, snapshot: T) {
        self.inner.insert(key, Arc::new(snapshot)).await;
    }

    /// Explicit invalidation, e.g. after a settings save.
    pub async fn invalidate(&self, key: &ViewKey) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl_secs: u64) -> CacheConfig {
        CacheConfig {
            snapshot_ttl_secs: ttl_secs,
            max_entries: 8,
        }
    }

    #[tokio::test]
    async fn distinct_spec_ids_do_not_collide() {
        let cache: SnapshotCache<u64> = SnapshotCache::new(&config(60));
        let revenue = ViewKey::new("orders", "", "revenue_trend");
        let frequency = ViewKey::new("orders", "", "order_frequency");

        cache.insert(revenue.clone(), 1).await;
        cache.insert(frequency.clone(), 2).await;

        assert_eq!(cache.get(&revenue).await.as_deref(), Some(&1));
        assert_eq!(cache.get(&frequency).await.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn invalidation_forces_the_next_reader_to_recompute() {
        let cache: SnapshotCache<u64> = SnapshotCache::new(&config(60));
        let key = ViewKey::new("delivery_settings", "", "settings");
        cache.insert(key.clone(), 7).await;
        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
    }
}
