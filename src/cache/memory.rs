//! Memory Backend Module
//!
//! In-process cache backend: a TTL map plus named sets behind a single lock.
//! Used for local runs without Redis and as the test double for outages.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheBackend, CacheEntry, CacheStats};
use crate::error::CacheError;

#[derive(Debug, Default)]
struct MemoryState {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Named string sets
    sets: HashMap<String, HashSet<String>>,
    /// Read statistics
    stats: CacheStats,
}

// == Memory Backend ==
/// Cache backend held entirely in process memory.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    /// When false every call fails as if the server were unreachable
    available: AtomicBool,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty, reachable backend.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    // == Outage Switch ==
    /// Marks the backend reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable(
                "memory backend is offline".to_string(),
            ))
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - state.entries.len();
        state.stats.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns a copy of the read statistics.
    pub async fn stats(&self) -> CacheStats {
        self.state.read().await.stats.clone()
    }

    // == Length ==
    /// Returns the number of value entries, expired or not.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no value entries and no sets are held.
    pub async fn is_empty(&self) -> bool {
        let state = self.state.read().await;
        state.entries.is_empty() && state.sets.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.ensure_available()?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                state.stats.record_hit();
                return Ok(Some(value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            state.stats.record_expired(1);
        }
        state.stats.record_miss();
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        state
            .entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        state.entries.remove(key);
        state.sets.remove(key);
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>, CacheError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.sets.get(key).cloned().unwrap_or_default())
    }

    async fn set_add(&self, key: &str, members: &[String]) -> Result<(), CacheError> {
        self.ensure_available()?;
        if members.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().await;
        state
            .sets
            .entry(key.to_string())
            .or_default()
            .extend(members.iter().cloned());
        Ok(())
    }

    async fn info(&self) -> Result<String, CacheError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let members: usize = state.sets.values().map(HashSet::len).sum();
        // Redis reports avg_ttl in milliseconds over keys that carry one
        let avg_ttl_ms = match state.entries.len() as u128 {
            0 => 0,
            n => {
                let total: u128 = state
                    .entries
                    .values()
                    .map(|entry| entry.ttl_remaining().as_millis())
                    .sum();
                total / n
            }
        };

        let mut out = String::from("# Server\r\nbackend:memory\r\n\r\n");
        state.stats.write_info(&mut out);
        let _ = write!(
            out,
            "\r\n# Keyspace\r\nkeys:{}\r\navg_ttl:{}\r\nsets:{}\r\nset_members:{}\r\n",
            state.entries.len(),
            avg_ttl_ms,
            state.sets.len(),
            members,
        );
        Ok(out)
    }
}
