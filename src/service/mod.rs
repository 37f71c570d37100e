//! Service Module
//!
//! The cache-aside reader, the deduplicating writer and the cache probe.
//! Each component receives its backends explicitly so tests can swap them.

mod probe;
mod reader;
mod writer;


use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheBackend, CacheKeys};
use crate::store::RecordStore;

pub use probe::AvailabilityProbe;
pub use reader::CacheAsideReader;
pub use writer::DedupWriter;

// == Cache Status ==
/// Where a read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Snapshot found in the cache
    Hit,
    /// Snapshot absent, loaded from the store and cached
    Miss,
    /// Cache GET failed, served from the store (the snapshot SET is still tried)
    Error,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A value together with the cache status of the read that produced it.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    pub value: T,
    pub status: CacheStatus,
}

impl<T> CacheRead<T> {
    pub fn new(value: T, status: CacheStatus) -> Self {
        Self { value, status }
    }
}

// == Weather Service ==
/// The three components wired to one cache backend and one record store.
pub struct WeatherService {
    pub reader: CacheAsideReader,
    pub writer: DedupWriter,
    pub probe: AvailabilityProbe,
}

impl WeatherService {
    /// Builds all components over shared backends.
    ///
    /// # Arguments
    /// * `cache` - Cache backend, may be unreachable at any time
    /// * `store` - Authoritative record store
    /// * `keys` - Snapshot and membership keys
    /// * `ttl` - Snapshot lifetime
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn RecordStore>,
        keys: CacheKeys,
        ttl: Duration,
    ) -> Self {
        Self {
            reader: CacheAsideReader::new(cache.clone(), store.clone(), keys.snapshot.clone(), ttl),
            writer: DedupWriter::new(cache.clone(), store, keys),
            probe: AvailabilityProbe::new(cache),
        }
    }
}
