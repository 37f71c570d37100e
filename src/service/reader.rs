//! Cache-aside reader for the full record set.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{CacheRead, CacheStatus};
use crate::cache::CacheBackend;
use crate::error::Result;
use crate::models::WeatherRecord;
use crate::store::RecordStore;

/// Serves "all records", preferring the cached snapshot.
///
/// Cache failures never reach the caller: the read falls back to the store.
/// Only a store failure fails the read.
pub struct CacheAsideReader {
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn RecordStore>,
    snapshot_key: String,
    ttl: Duration,
}

impl CacheAsideReader {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn RecordStore>,
        snapshot_key: String,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            snapshot_key,
            ttl,
        }
    }

    /// Returns every stored record, from the snapshot when one is cached.
    ///
    /// Whenever the snapshot was not served, the store result is cached for
    /// the configured TTL. A failed GET is treated as an absent entry, so the
    /// SET is still attempted.
    pub async fn get_all(&self) -> Result<CacheRead<Vec<WeatherRecord>>> {
        let mut status = CacheStatus::Miss;

        match self.cache.get(&self.snapshot_key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<WeatherRecord>>(&bytes) {
                Ok(records) => {
                    debug!(records = records.len(), "Weather snapshot served from cache");
                    return Ok(CacheRead::new(records, CacheStatus::Hit));
                }
                Err(e) => {
                    warn!(error = %e, "Cached weather snapshot unreadable, reloading from store");
                }
            },
            Ok(None) => debug!("Weather snapshot not cached"),
            Err(e) => {
                warn!(error = %e, "Cache unavailable, reading weather records from store");
                status = CacheStatus::Error;
            }
        }

        let records = self.store.select_all().await?;
        self.populate(&records).await;

        Ok(CacheRead::new(records, status))
    }

    async fn populate(&self, records: &[WeatherRecord]) {
        let bytes = match serde_json::to_vec(records) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Could not serialize weather snapshot");
                return;
            }
        };

        match self.cache.set(&self.snapshot_key, bytes, self.ttl).await {
            Ok(()) => debug!(
                records = records.len(),
                ttl_secs = self.ttl.as_secs(),
                "Weather snapshot cached"
            ),
            Err(e) => warn!(error = %e, "Could not update weather snapshot cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryBackend, SNAPSHOT_KEY};
    use crate::error::CacheError;
    use crate::models::NewWeatherRecord;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use crate::store::SqliteStore;
    use chrono::NaiveDate;

    fn paris() -> NewWeatherRecord {
        NewWeatherRecord::new("Paris", 10, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn rome() -> NewWeatherRecord {
        NewWeatherRecord::new("Rome", 15, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    fn reader(cache: &Arc<MemoryBackend>, store: &Arc<SqliteStore>, ttl: Duration) -> CacheAsideReader {
        CacheAsideReader::new(cache.clone(), store.clone(), SNAPSHOT_KEY.to_string(), ttl)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_many(vec![paris()]).await.unwrap();
        let reader = reader(&cache, &store, Duration::from_secs(60));

        let first = reader.get_all().await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.value.len(), 1);
        assert!(cache.get(SNAPSHOT_KEY).await.unwrap().is_some());

        let second = reader.get_all().await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.value, first.value);
    }

    #[tokio::test]
    async fn test_snapshot_hides_direct_store_writes_until_expiry() {
        let cache = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_many(vec![paris()]).await.unwrap();
        let reader = reader(&cache, &store, Duration::from_millis(200));

        assert_eq!(reader.get_all().await.unwrap().value.len(), 1);

        // Bypass the writer so nothing invalidates the snapshot
        store.insert_many(vec![rome()]).await.unwrap();
        let stale = reader.get_all().await.unwrap();
        assert_eq!(stale.status, CacheStatus::Hit);
        assert_eq!(stale.value.len(), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;

        let fresh = reader.get_all().await.unwrap();
        assert_eq!(fresh.status, CacheStatus::Miss);
        assert_eq!(fresh.value.len(), 2);
    }

    #[tokio::test]
    async fn test_fail_open_when_cache_down() {
        let cache = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_many(vec![paris(), rome()]).await.unwrap();
        let reader = reader(&cache, &store, Duration::from_secs(60));

        cache.set_available(false);
        let result = reader.get_all().await.unwrap();
        assert_eq!(result.status, CacheStatus::Error);
        assert_eq!(result.value.len(), 2);
        assert_eq!(result.value[0].city, "Paris");

        cache.set_available(true);
        assert!(cache.get(SNAPSHOT_KEY).await.unwrap().is_none());
    }

    /// Memory backend whose GET always times out while every other call works.
    struct TimingOutGet {
        inner: Arc<MemoryBackend>,
    }

    #[async_trait]
    impl CacheBackend for TimingOutGet {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Timeout(500))
        }

        async fn set(
            &self,
            key: &str,
            value: Vec<u8>,
            ttl: Duration,
        ) -> std::result::Result<(), CacheError> {
            self.inner.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> std::result::Result<(), CacheError> {
            self.inner.delete(key).await
        }

        async fn set_members(&self, key: &str) -> std::result::Result<HashSet<String>, CacheError> {
            self.inner.set_members(key).await
        }

        async fn set_add(&self, key: &str, members: &[String]) -> std::result::Result<(), CacheError> {
            self.inner.set_add(key, members).await
        }

        async fn info(&self) -> std::result::Result<String, CacheError> {
            self.inner.info().await
        }
    }

    #[tokio::test]
    async fn test_get_failure_still_repopulates_snapshot() {
        let memory = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_many(vec![paris(), rome()]).await.unwrap();
        let cache = Arc::new(TimingOutGet {
            inner: memory.clone(),
        });
        let reader = CacheAsideReader::new(
            cache,
            store.clone(),
            SNAPSHOT_KEY.to_string(),
            Duration::from_secs(60),
        );

        let result = reader.get_all().await.unwrap();
        assert_eq!(result.status, CacheStatus::Error);
        assert_eq!(result.value.len(), 2);

        let bytes = memory.get(SNAPSHOT_KEY).await.unwrap().expect("snapshot written");
        let cached: Vec<WeatherRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cached, result.value);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_reloads_from_store() {
        let cache = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_many(vec![paris()]).await.unwrap();
        cache
            .set(SNAPSHOT_KEY, b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        let reader = reader(&cache, &store, Duration::from_secs(60));

        let result = reader.get_all().await.unwrap();
        assert_eq!(result.status, CacheStatus::Miss);
        assert_eq!(result.value.len(), 1);

        assert_eq!(reader.get_all().await.unwrap().status, CacheStatus::Hit);
    }

    #[tokio::test]
    async fn test_empty_store_is_cached() {
        let cache = Arc::new(MemoryBackend::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let reader = reader(&cache, &store, Duration::from_secs(60));

        assert!(reader.get_all().await.unwrap().value.is_empty());
        let second = reader.get_all().await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert!(second.value.is_empty());
    }
}
