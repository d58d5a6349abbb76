use crate::params::CacheKey;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A stored value together with its key and last write time
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub key: CacheKey,
    pub payload: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Age of the entry at `now`, zero if `now` is before the write
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// An entry is fresh while `now - stored_at < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}
