//! Convenience re-exports for common BadgeHaus usage
//!
//! ```rust
//! use badgehaus::prelude::*;
//! ```

// Core BadgeHaus components
pub use crate::core::{BadgeHaus, default_partitions};
pub use crate::errors::BadgeHausError;

pub use crate::badges::{BadgeCacheRecord, BadgeRecord, BadgeService, FoilEvidence};
pub use crate::client::{BadgeApiClient, BadgeApiError, BadgeSource};
pub use crate::crafted::{
    CommunityClient, CraftedBadge, CraftedLevelSource, CraftedLevels, CraftedShowcase,
    annotate_crafted, crafted_showcase,
};
pub use crate::favorites::{FavoriteRecord, FavoritesRegistry, ToggleOutcome};
pub use crate::sorting::{FavoritesSortOrder, sort_canonical, sorted_canonical};

// Re-export centralized config
pub use config::{ApiConfig, AppConfig, CacheConfig, LoggingConfig, QueueConfig};

// Re-export signal system for change notifications
pub use signal_system::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

pub use dispatcher::{DispatchError, Dispatcher};

// Common external dependencies
pub use async_trait;
pub use tokio;
