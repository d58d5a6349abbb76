//! Core BadgeHaus functionality
//!
//! This module contains the BadgeHaus coordinator, which builds the cache
//! store, the request queue and the remote clients from one configuration
//! and hands out the badge service and the favorites registry that share them.

use std::sync::Arc;

use cache_system::{CacheManager, Expiry, PartitionSpec};
use config::AppConfig;
use dispatcher::Dispatcher;
use signal_system::SignalManager;

use crate::badges::{BADGE_PARTITION, BadgeService};
use crate::client::{BadgeApiClient, BadgeSource};
use crate::crafted::{CommunityClient, CraftedLevelSource};
use crate::errors::BadgeHausError;
use crate::favorites::{FAVORITES_PARTITION, FavoritesRegistry};

/// Partitions of the store: expiring badge data and non-expiring favorites
pub fn default_partitions() -> Vec<PartitionSpec> {
    vec![
        PartitionSpec::new(BADGE_PARTITION, "appId"),
        PartitionSpec::new(FAVORITES_PARTITION, "id").with_expiry(Expiry::Never),
    ]
}

/// Main BadgeHaus coordinator
pub struct BadgeHaus {
    config: AppConfig,
    cache: CacheManager,
    signals: Arc<SignalManager>,
    badges: BadgeService,
    favorites: FavoritesRegistry,
}

impl BadgeHaus {
    /// Create a coordinator talking to the configured remote endpoints
    ///
    /// No storage or network I/O happens here.
    pub fn new(config: AppConfig) -> Result<Self, BadgeHausError> {
        let source = Arc::new(BadgeApiClient::new(&config.api)?);
        let crafted = Arc::new(CommunityClient::new(&config.api)?);
        Self::with_sources(config, source, crafted)
    }

    /// Create a coordinator with caller-supplied remote sources
    pub fn with_sources(
        config: AppConfig,
        source: Arc<dyn BadgeSource>,
        crafted: Arc<dyn CraftedLevelSource>,
    ) -> Result<Self, BadgeHausError> {
        config.validate()?;

        let signals = Arc::new(SignalManager::new());
        let cache = CacheManager::new(config.cache.clone(), default_partitions())?
            .with_signal_manager(Arc::clone(&signals));
        let queue = Dispatcher::new(&config.queue);

        let badges = BadgeService::new(cache.clone(), queue, source, crafted);
        let favorites = FavoritesRegistry::new(cache.clone());

        Ok(Self {
            config,
            cache,
            signals,
            badges,
            favorites,
        })
    }

    /// Once-per-session housekeeping: drop expired badge data
    ///
    /// Returns how many entries were removed. An unavailable store is
    /// logged and leaves the session running without a cache.
    pub async fn startup(&self) -> u64 {
        let removed = self.cache.sweep_expired().await;
        tracing::info!(removed, "badgehaus session started");
        removed
    }

    pub async fn shutdown(&self) {
        self.cache.close().await;
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Change notifications of the store, for keeping views in sync
    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    pub fn badges(&self) -> &BadgeService {
        &self.badges
    }

    pub fn favorites(&self) -> &FavoritesRegistry {
        &self.favorites
    }
}
