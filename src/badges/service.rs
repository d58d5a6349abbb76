//! Badge data service
//!
//! Answers "badges for app X": a fresh cache entry is returned as is,
//! anything else goes through the request queue to the remote listing,
//! gets normalized and is written back to the cache. Every failure is
//! logged and reported to the caller as "no data".

use std::sync::Arc;

use cache_system::CacheManager;
use dispatcher::Dispatcher;

use super::envelope::BadgeEnvelope;
use super::record::{BadgeCacheRecord, BadgeRecord};
use crate::client::BadgeSource;
use crate::crafted::{CraftedLevelSource, CraftedShowcase, annotate_crafted, crafted_showcase};
use crate::errors::BadgeHausError;

/// Partition holding one `BadgeCacheRecord` per app, keyed by `appId`
pub const BADGE_PARTITION: &str = "badge_data";

#[derive(Clone)]
pub struct BadgeService {
    cache: CacheManager,
    queue: Dispatcher<BadgeCacheRecord>,
    source: Arc<dyn BadgeSource>,
    crafted: Arc<dyn CraftedLevelSource>,
}

impl BadgeService {
    pub fn new(
        cache: CacheManager,
        queue: Dispatcher<BadgeCacheRecord>,
        source: Arc<dyn BadgeSource>,
        crafted: Arc<dyn CraftedLevelSource>,
    ) -> Self {
        Self {
            cache,
            queue,
            source,
            crafted,
        }
    }

    /// Fresh cached data for `app_id`, without touching the network
    pub async fn cached_badge_data(&self, app_id: u32) -> Option<BadgeCacheRecord> {
        self.cache
            .get::<BadgeCacheRecord>(BADGE_PARTITION, app_id)
            .await
            .map(|entry| entry.payload)
    }

    /// Badges of `app_id`, absent when they could not be obtained
    pub async fn fetch_badge_data(&self, app_id: u32) -> Option<Vec<BadgeRecord>> {
        self.fetch_badge_record(app_id).await.map(|record| record.badges)
    }

    /// Like `fetch_badge_data`, keeping the resolved app name
    pub async fn fetch_badge_record(&self, app_id: u32) -> Option<BadgeCacheRecord> {
        match self.try_fetch_badge_record(app_id).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(app_id, error = %e, "error fetching badge data");
                None
            }
        }
    }

    pub async fn try_fetch_badge_record(
        &self,
        app_id: u32,
    ) -> Result<BadgeCacheRecord, BadgeHausError> {
        if let Some(record) = self.cached_badge_data(app_id).await {
            tracing::debug!(app_id, "using cached badge data");
            return Ok(record);
        }

        let cache = self.cache.clone();
        let lookup_cache = self.cache.clone();
        let source = Arc::clone(&self.source);
        let record = self
            .queue
            .enqueue_with_lookup(
                app_id,
                move |app_id| cached_while_queued(lookup_cache, app_id),
                move |app_id| fetch_and_store(cache, source, app_id),
            )
            .await?;
        Ok(record)
    }

    /// Drop the cached entry, refetch and annotate crafted status
    pub async fn refresh_badge_data(&self, app_id: u32) -> Option<Vec<BadgeRecord>> {
        match self.try_refresh_badge_data(app_id).await {
            Ok(record) => Some(record.badges),
            Err(e) => {
                tracing::warn!(app_id, error = %e, "error refreshing badge data");
                None
            }
        }
    }

    pub async fn try_refresh_badge_data(
        &self,
        app_id: u32,
    ) -> Result<BadgeCacheRecord, BadgeHausError> {
        self.cache.delete(BADGE_PARTITION, app_id).await;

        let mut record = self.try_fetch_badge_record(app_id).await?;
        let levels = self.crafted.crafted_levels(app_id).await;
        annotate_crafted(&mut record.badges, &levels);
        crate::debug_log!(app_id, badges = ?record.badges, "annotated badges");

        if !self.cache.put(BADGE_PARTITION, &record).await {
            tracing::warn!(app_id, "annotated badge data was not cached");
        }
        Ok(record)
    }

    /// Crafted badges to feature for `app_id`, absent when there is no badge data
    pub async fn crafted_showcase(&self, app_id: u32) -> Option<CraftedShowcase> {
        let badges = self.fetch_badge_data(app_id).await?;
        let levels = self.crafted.crafted_levels(app_id).await;
        Some(crafted_showcase(app_id, &badges, &levels))
    }
}

/// An earlier request for the same app may have filled the cache while this one waited
async fn cached_while_queued(cache: CacheManager, app_id: u32) -> Option<BadgeCacheRecord> {
    let entry = cache.get::<BadgeCacheRecord>(BADGE_PARTITION, app_id).await?;
    tracing::debug!(app_id, "badge data cached while queued");
    Some(entry.payload)
}

/// Queued producer: one network call, then normalize and cache
async fn fetch_and_store(
    cache: CacheManager,
    source: Arc<dyn BadgeSource>,
    app_id: u32,
) -> anyhow::Result<BadgeCacheRecord> {
    tracing::info!(app_id, "fetching badge data");
    let raw = source.list_badges(app_id).await?;
    let record = BadgeEnvelope::decode(raw)?.into_listing().normalize(app_id);
    crate::debug_log!(app_id, badges = ?record.badges, "normalized badges");

    if !cache.put(BADGE_PARTITION, &record).await {
        tracing::warn!(app_id, "badge data was not cached");
    }
    Ok(record)
}
