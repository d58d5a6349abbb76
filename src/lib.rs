//! # BadgeHaus
//!
//! Badge metadata for apps, fetched from a remote listing through a paced
//! request queue, cached in a local SQLite store with expiry, plus a
//! registry of favorite badges that survives across sessions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use badgehaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     badgehaus::telemetry::init_tracing(&config.logging)?;
//!
//!     let haus = BadgeHaus::new(config)?;
//!     haus.startup().await;
//!
//!     if let Some(mut badges) = haus.badges().fetch_badge_data(440).await {
//!         sort_canonical(&mut badges);
//!         for badge in &badges {
//!             println!("{} (level {})", badge.name, badge.base_level);
//!         }
//!         haus.favorites().toggle(&badges[0]).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod badges;
pub mod client;
pub mod core;
pub mod crafted;
pub mod errors;
pub mod favorites;
pub mod prelude;
pub mod sorting;
pub mod telemetry;

// Re-export the main public types for convenience
pub use core::{BadgeHaus, default_partitions};
pub use errors::BadgeHausError;

// Re-export centralized config
pub use config::{ApiConfig, AppConfig, CacheConfig, LoggingConfig, QueueConfig};

// Re-export internal crates used in the public API
pub use cache_system;
pub use dispatcher;
pub use signal_system;

// Re-export external dependencies used in public API
pub use async_trait;
