//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::entry::CacheEntry;
pub use crate::errors::CacheError;
pub use crate::manager::CacheManager;
pub use crate::params::{CacheKey, Expiry, PartitionSpec};
pub use crate::transaction::PartitionTransaction;

// Re-export centralized config
pub use config::CacheConfig;

// Common external dependencies
pub use serde::{Deserialize, Serialize};
pub use serde_json;
