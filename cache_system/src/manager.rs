//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: a partitioned,
//! SQLite-backed key-value store with per-entry timestamps and expiry.
//! The connection is opened lazily on first use, shared by every clone
//! of the manager, and reset to "unopened" when opening fails so a later
//! call may try again.

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::errors::CacheError;
use crate::params::{CacheKey, PartitionSpec};
use crate::transaction::PartitionTransaction;
use crate::validation::ValidatedPartitionName;
use chrono::{DateTime, Utc};
use config::CacheConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use signal_system::{EventType, SignalManager, StoreEvent};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// SQLite-backed partitioned cache store
#[derive(Clone)]
pub struct CacheManager {
    config: Arc<CacheConfig>,
    partitions: Arc<Vec<PartitionSpec>>,
    connection_pool: Arc<RwLock<Option<SqlitePool>>>,
    clock: Arc<dyn Clock>,
    signal_manager: Option<Arc<SignalManager>>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = match self.connection_pool.try_read() {
            Ok(pool) => {
                if pool.is_some() {
                    "open"
                } else {
                    "unopened"
                }
            }
            Err(_) => "opening",
        };

        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("partitions", &self.partitions)
            .field("connection", &connection_status)
            .finish()
    }
}

impl CacheManager {
    /// Create a new cache manager; no I/O happens until the first operation or `open`
    pub fn new(
        config: CacheConfig,
        partitions: impl IntoIterator<Item = PartitionSpec>,
    ) -> Result<Self, CacheError> {
        let mut declared: Vec<PartitionSpec> = Vec::new();
        for spec in partitions {
            ValidatedPartitionName::new(&spec.name)?;
            if !declared.iter().any(|existing| existing.name == spec.name) {
                declared.push(spec);
            }
        }

        Ok(Self {
            config: Arc::new(config),
            partitions: Arc::new(declared),
            connection_pool: Arc::new(RwLock::new(None)),
            clock: Arc::new(SystemClock),
            signal_manager: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_signal_manager(mut self, signal_manager: Arc<SignalManager>) -> Self {
        self.signal_manager = Some(signal_manager);
        self
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn partitions(&self) -> &[PartitionSpec] {
        &self.partitions
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Open the store and create any missing partitions. Idempotent.
    pub async fn open(&self) -> Result<(), CacheError> {
        self.get_pool().await.map(|_| ())
    }

    /// Close the store; a later operation opens it again
    pub async fn close(&self) {
        let pool = self.connection_pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            tracing::debug!("cache store closed");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.connection_pool.read().await.is_some()
    }

    /// Get or open the shared pool
    pub(crate) async fn get_pool(&self) -> Result<SqlitePool, CacheError> {
        if let Some(pool) = self.connection_pool.read().await.as_ref() {
            return Ok(pool.clone());
        }

        let mut pool = self.connection_pool.write().await;
        if let Some(existing) = pool.as_ref() {
            return Ok(existing.clone());
        }

        match self.connect().await {
            Ok(connected) => {
                tracing::debug!(database_url = %self.config.database_url, "cache store opened");
                *pool = Some(connected.clone());
                Ok(connected)
            }
            Err(e) => {
                tracing::error!(
                    database_url = %self.config.database_url,
                    error = %e,
                    "failed to open cache store"
                );
                Err(CacheError::Unavailable(e.to_string()))
            }
        }
    }

    async fn connect(&self) -> Result<SqlitePool, CacheError> {
        let url = normalize_database_url(&self.config.database_url);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // One connection: an in-memory database lives exactly as long as its
        // connection, and writes are serialized anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        if let Err(e) = self.create_partitions(&pool).await {
            pool.close().await;
            return Err(e);
        }

        Ok(pool)
    }

    async fn create_partitions(&self, pool: &SqlitePool) -> Result<(), CacheError> {
        for spec in self.partitions.iter() {
            let create_table_sql = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (
                    key TEXT PRIMARY KEY NOT NULL,
                    payload TEXT NOT NULL,
                    stored_at INTEGER NOT NULL
                )",
                spec.name
            );
            sqlx::query(&create_table_sql).execute(pool).await?;

            let index_sql = format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{}_stored_at\" ON \"{}\"(stored_at)",
                spec.name, spec.name
            );
            sqlx::query(&index_sql).execute(pool).await?;
        }
        Ok(())
    }

    pub(crate) fn spec(&self, partition: &str) -> Result<&PartitionSpec, CacheError> {
        self.partitions
            .iter()
            .find(|spec| spec.name == partition)
            .ok_or_else(|| CacheError::UnknownPartition(partition.to_string()))
    }

    /// Extract the key of a value according to its partition's key field
    pub(crate) fn key_of(&self, spec: &PartitionSpec, value: &Value) -> Result<CacheKey, CacheError> {
        value
            .get(&spec.key_field)
            .and_then(CacheKey::from_json)
            .ok_or_else(|| CacheError::MissingKey {
                partition: spec.name.clone(),
                field: spec.key_field.clone(),
            })
    }

    /// Turn a stored row into an entry, hiding it if it has gone stale
    pub(crate) fn fresh_entry<T: DeserializeOwned>(
        &self,
        spec: &PartitionSpec,
        key: CacheKey,
        row: StoredRow,
    ) -> Result<Option<CacheEntry<T>>, CacheError> {
        let entry = row.into_entry::<T>(key)?;
        if let Some(ttl) = spec.ttl(self.config.ttl_duration()) {
            if !entry.is_fresh(self.clock.now(), ttl) {
                tracing::debug!(partition = %spec.name, key = %entry.key, "cache entry expired");
                return Ok(None);
            }
        }
        Ok(Some(entry))
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        if let Some(signal_manager) = &self.signal_manager {
            signal_manager.emit(event);
        }
    }

    /// Get a non-expired entry
    pub async fn try_get<T: DeserializeOwned>(
        &self,
        partition: &str,
        key: impl Into<CacheKey>,
    ) -> Result<Option<CacheEntry<T>>, CacheError> {
        let spec = self.spec(partition)?;
        let key = key.into();
        let pool = self.get_pool().await?;

        match fetch_row(&pool, &spec.name, &key.encode()).await? {
            Some(row) => self.fresh_entry(spec, key, row),
            None => Ok(None),
        }
    }

    /// Get a non-expired entry; absent when missing, stale or the store is unavailable
    pub async fn get<T: DeserializeOwned>(
        &self,
        partition: &str,
        key: impl Into<CacheKey>,
    ) -> Option<CacheEntry<T>> {
        let key = key.into();
        match self.try_get(partition, key.clone()).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(partition, key = %key, error = %e, "cache get failed");
                None
            }
        }
    }

    /// Write or overwrite the entry for the value's key, stamping it with the current time
    pub async fn try_put<T: Serialize>(
        &self,
        partition: &str,
        value: &T,
    ) -> Result<CacheKey, CacheError> {
        let spec = self.spec(partition)?;
        let value = serde_json::to_value(value)?;
        let key = self.key_of(spec, &value)?;
        let encoded_key = key.encode();
        let pool = self.get_pool().await?;

        let mut tx = pool.begin().await?;
        upsert_row(
            &mut *tx,
            &spec.name,
            &encoded_key,
            &value.to_string(),
            self.clock.now().timestamp_millis(),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(partition, key = %key, "cache entry stored");
        self.emit(StoreEvent::new(EventType::Put, partition).with_key(encoded_key));
        Ok(key)
    }

    /// Write or overwrite an entry; returns false instead of failing
    pub async fn put<T: Serialize>(&self, partition: &str, value: &T) -> bool {
        match self.try_put(partition, value).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(partition, error = %e, "cache put failed");
                false
            }
        }
    }

    /// Remove an entry; returns whether something was removed
    pub async fn try_delete(
        &self,
        partition: &str,
        key: impl Into<CacheKey>,
    ) -> Result<bool, CacheError> {
        let spec = self.spec(partition)?;
        let key = key.into();
        let encoded_key = key.encode();
        let pool = self.get_pool().await?;

        let mut tx = pool.begin().await?;
        let removed = delete_row(&mut *tx, &spec.name, &encoded_key).await?;
        tx.commit().await?;

        if removed > 0 {
            tracing::debug!(partition, key = %key, "cache entry deleted");
            self.emit(StoreEvent::new(EventType::Delete, partition).with_key(encoded_key));
        }
        Ok(removed > 0)
    }

    /// Remove an entry; deleting a missing key succeeds
    pub async fn delete(&self, partition: &str, key: impl Into<CacheKey>) -> bool {
        let key = key.into();
        match self.try_delete(partition, key.clone()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(partition, key = %key, error = %e, "cache delete failed");
                false
            }
        }
    }

    /// Every entry of a partition, expired ones included
    pub async fn try_list_all<T: DeserializeOwned>(
        &self,
        partition: &str,
    ) -> Result<Vec<CacheEntry<T>>, CacheError> {
        let spec = self.spec(partition)?;
        let pool = self.get_pool().await?;

        let sql = format!(
            "SELECT key, payload, stored_at FROM \"{}\" ORDER BY rowid",
            spec.name
        );
        let rows = sqlx::query_as::<_, (String, String, i64)>(&sql)
            .fetch_all(&pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (encoded_key, payload, stored_at) in rows {
            let Some(key) = CacheKey::decode(&encoded_key) else {
                tracing::warn!(partition, key = %encoded_key, "skipping entry with undecodable key");
                continue;
            };
            match (StoredRow { payload, stored_at }).into_entry::<T>(key) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(partition, key = %encoded_key, error = %e, "skipping undecodable entry");
                }
            }
        }
        Ok(entries)
    }

    /// Every entry of a partition; empty when the store is unavailable
    pub async fn list_all<T: DeserializeOwned>(&self, partition: &str) -> Vec<CacheEntry<T>> {
        match self.try_list_all(partition).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(partition, error = %e, "cache list failed");
                Vec::new()
            }
        }
    }

    /// Delete entries older than their partition's TTL in every expiring partition
    pub async fn try_sweep_expired(&self) -> Result<u64, CacheError> {
        let pool = self.get_pool().await?;
        let now_ms = self.clock.now().timestamp_millis();
        let mut total = 0;

        for spec in self.partitions.iter() {
            let Some(ttl) = spec.ttl(self.config.ttl_duration()) else {
                continue;
            };
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            let cutoff = now_ms.saturating_sub(ttl_ms);

            let mut tx = pool.begin().await?;
            let sql = format!("DELETE FROM \"{}\" WHERE stored_at < ?", spec.name);
            let removed = sqlx::query(&sql)
                .bind(cutoff)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tx.commit().await?;

            if removed > 0 {
                tracing::info!(partition = %spec.name, removed, "swept expired cache entries");
                self.emit(StoreEvent::new(EventType::Sweep, spec.name.as_str()).with_affected(removed));
            }
            total += removed;
        }

        Ok(total)
    }

    /// Sweep expired entries, logging instead of failing
    pub async fn sweep_expired(&self) -> u64 {
        match self.try_sweep_expired().await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "error clearing stale cache data");
                0
            }
        }
    }

    /// Begin a transaction spanning any number of partitions
    pub async fn transaction(&self) -> Result<PartitionTransaction<'_>, CacheError> {
        let pool = self.get_pool().await?;
        let tx = pool.begin().await?;
        Ok(PartitionTransaction::new(self, tx))
    }
}

/// Raw stored payload and timestamp
#[derive(Debug)]
pub(crate) struct StoredRow {
    pub payload: String,
    pub stored_at: i64,
}

impl StoredRow {
    pub(crate) fn into_entry<T: DeserializeOwned>(
        self,
        key: CacheKey,
    ) -> Result<CacheEntry<T>, CacheError> {
        Ok(CacheEntry {
            key,
            payload: serde_json::from_str(&self.payload)?,
            stored_at: DateTime::from_timestamp_millis(self.stored_at).unwrap_or_default(),
        })
    }
}

fn normalize_database_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{}", database_url)
    }
}

pub(crate) async fn fetch_row<'e, E>(
    executor: E,
    table: &str,
    key: &str,
) -> Result<Option<StoredRow>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT payload, stored_at FROM \"{}\" WHERE key = ?", table);
    let row = sqlx::query_as::<_, (String, i64)>(&sql)
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|(payload, stored_at)| StoredRow { payload, stored_at }))
}

pub(crate) async fn upsert_row<'e, E>(
    executor: E,
    table: &str,
    key: &str,
    payload: &str,
    stored_at: i64,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO \"{}\" (key, payload, stored_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, stored_at = excluded.stored_at",
        table
    );
    sqlx::query(&sql)
        .bind(key)
        .bind(payload)
        .bind(stored_at)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete_row<'e, E>(executor: E, table: &str, key: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("DELETE FROM \"{}\" WHERE key = ?", table);
    let result = sqlx::query(&sql).bind(key).execute(executor).await?;
    Ok(result.rows_affected())
}
