//! Favorites registry
//!
//! User-picked badges, one per app and variant, kept in their own
//! partition. Favorites never expire and are only removed by the user.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cache_system::{CacheError, CacheManager};

use crate::badges::{BADGE_PARTITION, BadgeCacheRecord, BadgeRecord, UNKNOWN_BADGE, UNKNOWN_GAME};

/// Partition holding favorites, keyed by `id`
pub const FAVORITES_PARTITION: &str = "favorites";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// `{app_id}_foil` or `{app_id}_regular`; derived on import when missing
    #[serde(default)]
    pub id: String,
    pub app_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub badge_image: String,
    #[serde(default)]
    pub is_foil: bool,
    #[serde(default)]
    pub app_name: String,
}

impl FavoriteRecord {
    pub fn id_for(app_id: u32, is_foil: bool) -> String {
        format!("{}_{}", app_id, if is_foil { "foil" } else { "regular" })
    }

    pub fn from_badge(badge: &BadgeRecord) -> Self {
        Self::merged(badge, None)
    }

    /// Build a favorite from `badge`, preferring non-empty fields of the cached data
    pub fn merged(badge: &BadgeRecord, cached: Option<&BadgeCacheRecord>) -> Self {
        let cached = cached.filter(|record| record.app_id == badge.app_id);
        let matching = cached.and_then(|record| {
            record
                .badges
                .iter()
                .find(|b| b.is_foil == badge.is_foil && b.name == badge.name)
        });

        let name = pick([badge.name.as_str()]).unwrap_or(UNKNOWN_BADGE);
        let badge_image = pick([
            matching.map_or("", |b| b.badge_image.as_str()),
            badge.badge_image.as_str(),
        ])
        .unwrap_or_default();
        let app_name = pick([
            cached.map_or("", |record| record.app_name.as_str()),
            matching.map_or("", |b| b.app_name.as_str()),
            badge.app_name.as_str(),
        ])
        .unwrap_or(UNKNOWN_GAME);

        Self {
            id: Self::id_for(badge.app_id, badge.is_foil),
            app_id: badge.app_id,
            name: name.to_string(),
            badge_image: badge_image.to_string(),
            is_foil: badge.is_foil,
            app_name: app_name.to_string(),
        }
    }

    fn with_derived_id(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = Self::id_for(self.app_id, self.is_foil);
        }
        self
    }
}

/// First candidate that is non-empty and not a placeholder
fn pick<'a, const N: usize>(candidates: [&'a str; N]) -> Option<&'a str> {
    candidates.into_iter().find(|value| {
        let value = value.trim();
        !value.is_empty() && value != UNKNOWN_GAME && value != UNKNOWN_BADGE
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(FavoriteRecord),
    Removed,
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added(_))
    }
}

#[derive(Debug, Clone)]
pub struct FavoritesRegistry {
    cache: CacheManager,
}

impl FavoritesRegistry {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Remove the favorite for this badge's app and variant, or add it
    ///
    /// The lookup, the cached badge data read and the write happen in one
    /// transaction.
    pub async fn toggle(&self, badge: &BadgeRecord) -> Result<ToggleOutcome, CacheError> {
        let id = FavoriteRecord::id_for(badge.app_id, badge.is_foil);
        let mut tx = self.cache.transaction().await?;

        if tx
            .get::<FavoriteRecord>(FAVORITES_PARTITION, &id)
            .await?
            .is_some()
        {
            tx.delete(FAVORITES_PARTITION, &id).await?;
            tx.commit().await?;
            tracing::info!(app_id = badge.app_id, foil = badge.is_foil, "removed favorite");
            return Ok(ToggleOutcome::Removed);
        }

        let cached = tx
            .get::<BadgeCacheRecord>(BADGE_PARTITION, badge.app_id)
            .await?
            .map(|entry| entry.payload);
        let favorite = FavoriteRecord::merged(badge, cached.as_ref());
        tx.put(FAVORITES_PARTITION, &favorite).await?;
        tx.commit().await?;

        tracing::info!(app_id = badge.app_id, foil = badge.is_foil, "added favorite");
        Ok(ToggleOutcome::Added(favorite))
    }

    /// All favorites in storage order; empty when the store is unavailable
    pub async fn list(&self) -> Vec<FavoriteRecord> {
        self.cache
            .list_all::<FavoriteRecord>(FAVORITES_PARTITION)
            .await
            .into_iter()
            .map(|entry| entry.payload)
            .collect()
    }

    pub async fn is_favorite(&self, app_id: u32, is_foil: bool) -> bool {
        self.cache
            .get::<FavoriteRecord>(FAVORITES_PARTITION, FavoriteRecord::id_for(app_id, is_foil))
            .await
            .is_some()
    }

    /// Remove one favorite by id; removing a missing id succeeds
    pub async fn remove(&self, id: &str) -> bool {
        self.cache.delete(FAVORITES_PARTITION, id).await
    }

    /// Create or overwrite each record by id; returns how many were written
    ///
    /// Favorites missing from `records` are left alone.
    pub async fn bulk_import<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = FavoriteRecord>,
    {
        let mut written = 0;
        for record in records {
            let record = record.with_derived_id();
            if self.cache.put(FAVORITES_PARTITION, &record).await {
                written += 1;
            } else {
                tracing::warn!(id = %record.id, "favorite was not imported");
            }
        }
        tracing::info!(written, "imported favorites");
        written
    }

    /// Pretty-printed JSON array of every favorite
    pub async fn export_json(&self) -> Result<String, CacheError> {
        let favorites: Vec<FavoriteRecord> = self
            .cache
            .try_list_all::<FavoriteRecord>(FAVORITES_PARTITION)
            .await?
            .into_iter()
            .map(|entry| entry.payload)
            .collect();
        Ok(serde_json::to_string_pretty(&favorites)?)
    }

    /// Import a JSON array previously produced by `export_json`
    ///
    /// The input must be an array; elements that are not valid favorites
    /// are skipped with a warning.
    pub async fn import_json(&self, json: &str) -> Result<usize, CacheError> {
        let elements: Vec<Value> = serde_json::from_str(json)?;
        let records = elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| match serde_json::from_value::<FavoriteRecord>(element) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed favorite");
                    None
                }
            })
            .collect::<Vec<_>>();
        Ok(self.bulk_import(records).await)
    }
}
