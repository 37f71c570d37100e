//! Cache Statistics Module
//!
//! Read counters kept by the memory backend, rendered in Redis INFO style.

use std::fmt::Write;

/// Memory backend read counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// GETs that found a live entry
    pub hits: u64,
    /// GETs that found nothing or an expired entry
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub expired: u64,
}

impl CacheStats {
    /// hits / (hits + misses), 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    /// Appends the `# Stats` section of an INFO reply to `out`.
    pub fn write_info(&self, out: &mut String) {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "# Stats\r\nkeyspace_hits:{}\r\nkeyspace_misses:{}\r\nexpired_keys:{}\r\nhit_rate:{:.2}\r\n",
            self.hits,
            self.misses,
            self.expired,
            self.hit_rate()
        );
    }
}
