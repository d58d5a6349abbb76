//! Transaction support for CacheManager
//!
//! This module lets several reads and writes, possibly across partitions,
//! run atomically. Change signals are held back until the commit succeeds.
//!
//! # Example
//! ```ignore
//! let mut tx = manager.transaction().await?;
//! let existing = tx.get::<Favorite>("favorites", "440_foil").await?;
//! if existing.is_some() {
//!     tx.delete("favorites", "440_foil").await?;
//! }
//! tx.commit().await?;
//! ```

use crate::entry::CacheEntry;
use crate::errors::CacheError;
use crate::manager::{delete_row, fetch_row, upsert_row, CacheManager};
use crate::params::CacheKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use signal_system::{EventType, StoreEvent};
use sqlx::{Sqlite, Transaction};

/// A transactional view over the cache store
pub struct PartitionTransaction<'a> {
    manager: &'a CacheManager,
    tx: Transaction<'static, Sqlite>,
    pending_events: Vec<StoreEvent>,
}

impl<'a> PartitionTransaction<'a> {
    pub(crate) fn new(manager: &'a CacheManager, tx: Transaction<'static, Sqlite>) -> Self {
        Self {
            manager,
            tx,
            pending_events: Vec::new(),
        }
    }

    /// Get a non-expired entry inside the transaction
    pub async fn get<T: DeserializeOwned>(
        &mut self,
        partition: &str,
        key: impl Into<CacheKey>,
    ) -> Result<Option<CacheEntry<T>>, CacheError> {
        let spec = self.manager.spec(partition)?;
        let key = key.into();

        match fetch_row(&mut *self.tx, &spec.name, &key.encode()).await? {
            Some(row) => self.manager.fresh_entry(spec, key, row),
            None => Ok(None),
        }
    }

    /// Write or overwrite the entry for the value's key
    pub async fn put<T: Serialize>(
        &mut self,
        partition: &str,
        value: &T,
    ) -> Result<CacheKey, CacheError> {
        let spec = self.manager.spec(partition)?;
        let value = serde_json::to_value(value)?;
        let key = self.manager.key_of(spec, &value)?;
        let encoded_key = key.encode();

        upsert_row(
            &mut *self.tx,
            &spec.name,
            &encoded_key,
            &value.to_string(),
            self.manager.now().timestamp_millis(),
        )
        .await?;

        self.pending_events
            .push(StoreEvent::new(EventType::Put, partition).with_key(encoded_key));
        Ok(key)
    }

    /// Remove an entry; returns whether something was removed
    pub async fn delete(
        &mut self,
        partition: &str,
        key: impl Into<CacheKey>,
    ) -> Result<bool, CacheError> {
        let spec = self.manager.spec(partition)?;
        let encoded_key = key.into().encode();

        let removed = delete_row(&mut *self.tx, &spec.name, &encoded_key).await?;
        if removed > 0 {
            self.pending_events
                .push(StoreEvent::new(EventType::Delete, partition).with_key(encoded_key));
        }
        Ok(removed > 0)
    }

    /// Commit the transaction and publish its change signals
    pub async fn commit(self) -> Result<(), CacheError> {
        self.tx.commit().await?;
        for event in self.pending_events {
            self.manager.emit(event);
        }
        Ok(())
    }

    /// Rollback the transaction; no signals are published
    pub async fn rollback(self) -> Result<(), CacheError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
