//! Cache Module
//!
//! The cache backend seam used by the reader and writer, plus its Redis and
//! in-memory implementations.

mod entry;
mod memory;
mod redis_backend;
mod stats;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use stats::CacheStats;

// == Public Constants ==
/// Key holding the serialized "all records" snapshot
pub const SNAPSHOT_KEY: &str = "weather_all";

/// Key holding the set of dedup keys known to the store
pub const MEMBERSHIP_KEY: &str = "weather_keys";

// == Cache Backend Trait ==
/// Key-value store with TTL and set support.
///
/// Every call may fail independently of the record store. Callers decide
/// what a failure means; implementations never retry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `GET key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// `SET key value EX ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// `DEL key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// `SMEMBERS key`, empty when the set does not exist.
    async fn set_members(&self, key: &str) -> Result<HashSet<String>, CacheError>;

    /// `SADD key member...` as a single command.
    async fn set_add(&self, key: &str, members: &[String]) -> Result<(), CacheError>;

    /// Raw `INFO` diagnostic text.
    async fn info(&self) -> Result<String, CacheError>;
}

// == Cache Keys ==
/// The two well-known keys, with an optional instance prefix applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    /// Snapshot entry key
    pub snapshot: String,
    /// Membership set key
    pub membership: String,
}

impl CacheKeys {
    /// Builds both keys under `prefix`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            snapshot: format!("{prefix}{SNAPSHOT_KEY}"),
            membership: format!("{prefix}{MEMBERSHIP_KEY}"),
        }
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::with_prefix("")
    }
}
