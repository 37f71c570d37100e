//! Deduplicating writer.
//!
//! Candidates are checked against the membership set of known dedup keys.
//! The set lives in the cache and is rebuilt from the store whenever it is
//! found empty. If the set is non-empty it must contain every stored key, so
//! it is only ever written as a whole (one SADD) and dropped when an update
//! may have left it incomplete.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheBackend, CacheKeys};
use crate::error::{Result, StoreError, WeatherError};
use crate::models::NewWeatherRecord;
use crate::store::RecordStore;

/// Where the known-keys set for one call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySource {
    /// Membership set read from the cache
    Cache,
    /// Membership set rebuilt from the store during this call
    Rehydrated,
    /// Cache unusable for this call; keys scanned from the store only
    Store,
}

struct KnownKeys {
    keys: HashSet<String>,
    source: KeySource,
}

impl KnownKeys {
    fn cache_writable(&self) -> bool {
        self.source != KeySource::Store
    }
}

/// Inserts only candidates whose dedup key is not yet stored.
pub struct DedupWriter {
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn RecordStore>,
    keys: CacheKeys,
}

impl DedupWriter {
    pub fn new(cache: Arc<dyn CacheBackend>, store: Arc<dyn RecordStore>, keys: CacheKeys) -> Self {
        Self { cache, store, keys }
    }

    /// Stores the new candidates and returns how many were inserted.
    ///
    /// Candidates are evaluated in input order; within one batch the first
    /// occurrence of a dedup key wins. Cache failures fall back to the store
    /// and are never returned.
    ///
    /// The store's unique index has the last word. If it rejects the batch,
    /// the known keys were stale: they are rebuilt from the store and the
    /// batch is re-partitioned and inserted once more. A second conflict means
    /// a concurrent writer got there first and is returned as `Conflict`.
    pub async fn insert_new(&self, candidates: Vec<NewWeatherRecord>) -> Result<usize> {
        if candidates.is_empty() {
            return Err(WeatherError::InvalidInput(
                "No weather data provided.".to_string(),
            ));
        }
        if let Some(msg) = candidates.iter().find_map(NewWeatherRecord::validate) {
            return Err(WeatherError::InvalidInput(msg));
        }

        let mut known = self.known_keys().await?;
        let (mut fresh, mut fresh_keys) = partition(&candidates, &known.keys);
        if fresh.is_empty() {
            info!(submitted = candidates.len(), "No new weather records to insert");
            return Ok(0);
        }

        let stored = match self.store.insert_many(fresh).await {
            Ok(stored) => stored,
            Err(StoreError::Conflict(msg)) => {
                warn!(error = %msg, "Store rejected a known duplicate, rechecking against store");
                known = self.recheck(known.cache_writable()).await?;
                (fresh, fresh_keys) = partition(&candidates, &known.keys);
                if fresh.is_empty() {
                    info!(submitted = candidates.len(), "No new weather records to insert");
                    return Ok(0);
                }
                self.store.insert_many(fresh).await?
            }
            Err(e) => return Err(e.into()),
        };

        if known.cache_writable() {
            if let Err(e) = self.cache.set_add(&self.keys.membership, &fresh_keys).await {
                // A set missing stored keys is worse than no set at all
                warn!(error = %e, "Could not update duplicate check set");
                self.drop_membership().await;
            }
        }

        if let Err(e) = self.cache.delete(&self.keys.snapshot).await {
            warn!(error = %e, "Could not invalidate weather snapshot cache");
        }

        info!(
            inserted = stored.len(),
            duplicates = candidates.len() - stored.len(),
            "Weather records inserted"
        );
        Ok(stored.len())
    }

    /// Resolves the set of dedup keys already stored.
    async fn known_keys(&self) -> Result<KnownKeys> {
        match self.cache.set_members(&self.keys.membership).await {
            Ok(members) if !members.is_empty() => {
                debug!(keys = members.len(), "Duplicate check set read from cache");
                Ok(KnownKeys {
                    keys: members,
                    source: KeySource::Cache,
                })
            }
            Ok(_) => {
                let existing = self.store.select_dedup_keys().await?;
                info!(keys = existing.len(), "Duplicate check set empty, rehydrating from store");
                let source = self.rehydrate(&existing).await;
                Ok(KnownKeys {
                    keys: existing.into_iter().collect(),
                    source,
                })
            }
            Err(e) => {
                warn!(error = %e, "Cache unavailable, checking duplicates against store");
                let existing = self.store.select_dedup_keys().await?;
                Ok(KnownKeys {
                    keys: existing.into_iter().collect(),
                    source: KeySource::Store,
                })
            }
        }
    }

    /// Rebuilds the known keys from the store after a conflict.
    ///
    /// When the cache was usable the stale membership set is replaced.
    async fn recheck(&self, cache_writable: bool) -> Result<KnownKeys> {
        let existing = self.store.select_dedup_keys().await?;

        let source = if !cache_writable {
            KeySource::Store
        } else {
            match self.cache.delete(&self.keys.membership).await {
                Ok(()) => self.rehydrate(&existing).await,
                Err(e) => {
                    warn!(error = %e, "Could not drop stale duplicate check set");
                    KeySource::Store
                }
            }
        };

        Ok(KnownKeys {
            keys: existing.into_iter().collect(),
            source,
        })
    }

    /// Writes `existing` into the membership set with a single SADD.
    ///
    /// A partial set would hide stored keys, so on failure nothing more is
    /// written to the cache for the rest of the call.
    async fn rehydrate(&self, existing: &[String]) -> KeySource {
        match self.cache.set_add(&self.keys.membership, existing).await {
            Ok(()) => KeySource::Rehydrated,
            Err(e) => {
                warn!(error = %e, "Could not rehydrate duplicate check set");
                KeySource::Store
            }
        }
    }

    /// Deletes the membership set so the next write rehydrates it.
    async fn drop_membership(&self) {
        if let Err(e) = self.cache.delete(&self.keys.membership).await {
            warn!(error = %e, "Could not drop duplicate check set");
        }
    }
}

/// Splits out the candidates that are new, first occurrence winning.
///
/// Returns the new records and their dedup keys, both in input order.
fn partition(
    candidates: &[NewWeatherRecord],
    known: &HashSet<String>,
) -> (Vec<NewWeatherRecord>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut fresh = Vec::new();
    let mut fresh_keys = Vec::new();

    for candidate in candidates {
        let key = candidate.dedup_key();
        if !known.contains(&key) && seen.insert(key.clone()) {
            fresh.push(candidate.clone());
            fresh_keys.push(key);
        }
    }

    (fresh, fresh_keys)
}
