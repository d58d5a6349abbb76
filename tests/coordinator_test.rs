mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use badgehaus::badges::{BADGE_PARTITION, BadgeCacheRecord};
use badgehaus::favorites::FAVORITES_PARTITION;
use badgehaus::prelude::*;
use common::*;

fn config_at(database_url: String, ttl_seconds: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.cache = CacheConfig::new(database_url, ttl_seconds);
    config.queue = QueueConfig::new(0);
    config
}

#[tokio::test]
async fn test_data_survives_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("badges.db").display());
    let source = FakeSource::with_body(tf2_listing());

    {
        let haus = BadgeHaus::with_sources(config_at(url.clone(), TTL_SECS), source.clone(), Arc::<FakeCrafted>::default()).unwrap();
        haus.startup().await;
        let badges = haus.badges().fetch_badge_data(440).await.unwrap();
        haus.favorites().toggle(&badges[0]).await.unwrap();
        haus.shutdown().await;
    }

    let haus = BadgeHaus::with_sources(config_at(url, TTL_SECS), source.clone(), Arc::<FakeCrafted>::default()).unwrap();
    assert_eq!(haus.startup().await, 0);
    assert!(haus.badges().fetch_badge_data(440).await.is_some());
    assert_eq!(source.calls(), 1);
    assert!(haus.favorites().is_favorite(440, false).await);
}

#[tokio::test]
async fn test_startup_sweeps_expired_badges_but_not_favorites() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("badges.db").display());
    let source = FakeSource::with_body(tf2_listing());

    let haus = BadgeHaus::with_sources(config_at(url, 1), source, Arc::<FakeCrafted>::default()).unwrap();
    let badges = haus.badges().fetch_badge_data(440).await.unwrap();
    haus.favorites().toggle(&badges[0]).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(haus.startup().await, 1);

    assert!(haus.cache().list_all::<BadgeCacheRecord>(BADGE_PARTITION).await.is_empty());
    assert_eq!(haus.favorites().list().await.len(), 1);
}

#[tokio::test]
async fn test_signals_report_changes() {
    let haus = BadgeHaus::with_sources(
        config_at("sqlite::memory:".to_string(), TTL_SECS),
        FakeSource::with_body(tf2_listing()),
        Arc::<FakeCrafted>::default(),
    )
    .unwrap();
    let seen: Arc<Mutex<Vec<(EventType, String)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    haus.signals().add_callback(move |event: &StoreEvent| {
        sink.lock()
            .unwrap()
            .push((event.event_type, event.partition.clone()));
    });

    let badges = haus.badges().fetch_badge_data(440).await.unwrap();
    haus.favorites().toggle(&badges[0]).await.unwrap();
    haus.favorites().toggle(&badges[0]).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (EventType::Put, BADGE_PARTITION.to_string()),
            (EventType::Put, FAVORITES_PARTITION.to_string()),
            (EventType::Delete, FAVORITES_PARTITION.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unavailable_store_degrades_to_network() {
    let source = FakeSource::with_body(tf2_listing());
    let haus = BadgeHaus::with_sources(
        config_at("sqlite:/nonexistent-dir/deeper/cache.db".to_string(), TTL_SECS),
        source.clone(),
        Arc::<FakeCrafted>::default(),
    )
    .unwrap();

    assert_eq!(haus.startup().await, 0);
    assert!(haus.badges().fetch_badge_data(440).await.is_some());
    assert!(!haus.cache().is_open().await);
    assert_eq!(source.calls(), 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = config_at(String::new(), TTL_SECS);
    let result = BadgeHaus::with_sources(
        config,
        FakeSource::with_body(tf2_listing()),
        Arc::<FakeCrafted>::default(),
    );
    assert!(matches!(result, Err(BadgeHausError::Config(_))));
}

#[test]
fn test_default_partitions() {
    let partitions = default_partitions();
    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions[0].key_field, "appId");
    assert_eq!(partitions[1].expiry, Expiry::Never);
}
