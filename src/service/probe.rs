//! Cache availability probe.

use std::sync::Arc;

use tracing::warn;

use crate::cache::CacheBackend;
use crate::error::Result;

/// Reports whether the cache backend answers a diagnostic command.
///
/// Purely operational; the reader and writer never consult it.
pub struct AvailabilityProbe {
    cache: Arc<dyn CacheBackend>,
}

impl AvailabilityProbe {
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self { cache }
    }

    /// Returns the backend's raw INFO text, or `CacheUnavailable`. No retry.
    pub async fn check_cache_health(&self) -> Result<String> {
        self.cache.info().await.map_err(|e| {
            warn!(error = %e, "Cache health check failed");
            e.into()
        })
    }
}
