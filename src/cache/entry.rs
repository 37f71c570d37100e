//! Cache Entry Module
//!
//! A value held by the memory backend together with its deadline.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Bytes stored under one key, valid until `deadline`.
///
/// Deadlines are taken from the monotonic clock, so wall clock adjustments
/// never resurrect or prematurely expire an entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    deadline: Instant,
}

impl CacheEntry {
    /// Creates an entry that expires `ttl` from now.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            deadline: Instant::now() + ttl,
        }
    }

    /// True once the deadline has been reached. An entry whose TTL has fully
    /// elapsed is never served.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time left before expiry, zero when already expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_fresh() {
        let entry = CacheEntry::new(b"[]".to_vec(), Duration::from_secs(60));

        assert_eq!(entry.value, b"[]");
        assert!(!entry.is_expired());
        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining >= Duration::from_secs(59));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(b"[]".to_vec(), Duration::from_millis(50));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new(Vec::new(), Duration::ZERO);
        assert!(entry.is_expired(), "Entry should be expired at its deadline");
    }
}
