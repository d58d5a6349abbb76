#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use badgehaus::async_trait::async_trait;
use badgehaus::badges::BadgeService;
use badgehaus::cache_system::CacheManager;
use badgehaus::client::{BadgeApiError, BadgeSource};
use badgehaus::crafted::{CraftedBadge, CraftedLevelSource, CraftedLevels};
use badgehaus::dispatcher::Dispatcher;
use badgehaus::{CacheConfig, QueueConfig, default_partitions};
use serde_json::{Value, json};

pub const TTL_SECS: u64 = 3600;

/// Badge listing that answers with a fixed body and counts calls
pub struct FakeSource {
    body: Option<Value>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_body(body: Value) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body),
            calls: AtomicUsize::new(0),
        })
    }

    /// Every call fails with a server error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BadgeSource for FakeSource {
    async fn list_badges(&self, _app_id: u32) -> Result<Value, BadgeApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(BadgeApiError::Status {
                status: 503,
                body: "maintenance".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeCrafted {
    levels: CraftedLevels,
    calls: AtomicUsize,
}

impl FakeCrafted {
    pub fn with_levels(normal: u32, foil: u32) -> Arc<Self> {
        Arc::new(Self {
            levels: CraftedLevels {
                normal: CraftedBadge {
                    level: normal,
                    ..Default::default()
                },
                foil: CraftedBadge {
                    level: foil,
                    ..Default::default()
                },
            },
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CraftedLevelSource for FakeCrafted {
    async fn crafted_levels(&self, _app_id: u32) -> CraftedLevels {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.levels.clone()
    }
}

/// Five normal levels and one foil, flat envelope
pub fn tf2_listing() -> Value {
    json!({
        "appName": "Team Fortress 2",
        "badges": [
            {"name": "Level 1", "baseLevel": 1, "image_hash": "l1.png", "scarcity": 12000},
            {"name": "Level 2", "baseLevel": 2, "image_hash": "l2.png"},
            {"name": "Level 3", "baseLevel": 3, "image_hash": "l3.png"},
            {"name": "Level 4", "baseLevel": 4, "image_hash": "l4.png"},
            {"name": "Level 5", "baseLevel": 5, "image_hash": "l5.png"},
            {"name": "Mann Co. - Foil 1", "baseLevel": 1, "image_hash": "foil.png"}
        ]
    })
}

pub fn memory_cache() -> CacheManager {
    CacheManager::new(
        CacheConfig::new("sqlite::memory:".to_string(), TTL_SECS),
        default_partitions(),
    )
    .unwrap()
}

pub fn unavailable_cache() -> CacheManager {
    CacheManager::new(
        CacheConfig::new(
            "sqlite:/nonexistent-dir/deeper/cache.db".to_string(),
            TTL_SECS,
        ),
        default_partitions(),
    )
    .unwrap()
}

pub fn service(
    cache: CacheManager,
    source: Arc<FakeSource>,
    crafted: Arc<FakeCrafted>,
    spacing_ms: u64,
) -> BadgeService {
    BadgeService::new(
        cache,
        Dispatcher::new(&QueueConfig::new(spacing_ms)),
        source,
        crafted,
    )
}
