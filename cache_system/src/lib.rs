//! Persistent cache store for BadgeHaus
//!
//! This crate provides a partitioned key-value store backed by SQLite,
//! with per-entry timestamps, TTL-based expiry and atomic transactions.

pub mod clock;
pub mod entry;
pub mod errors;
pub mod manager;
pub mod params;
pub mod prelude;
pub mod transaction;
pub mod validation;

// Re-export centralized config
pub use config::CacheConfig;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use errors::CacheError;
pub use manager::CacheManager;
pub use params::{CacheKey, Expiry, PartitionSpec};
pub use transaction::PartitionTransaction;
pub use validation::{ValidatedPartitionName, ValidationError};
