mod common;

use std::sync::Arc;

use badgehaus::badges::BadgeRecord;
use badgehaus::favorites::{FavoriteRecord, FavoritesRegistry, ToggleOutcome};
use badgehaus::sorting::FavoritesSortOrder;
use common::*;

fn badge(app_id: u32, name: &str, is_foil: bool) -> BadgeRecord {
    BadgeRecord::new(app_id, name, 1)
        .foil(is_foil)
        .with_image(format!("{}.png", app_id))
}

#[tokio::test]
async fn test_toggle_twice_restores_membership() {
    let registry = FavoritesRegistry::new(memory_cache());
    registry.toggle(&badge(570, "Level 1", false)).await.unwrap();
    let before = registry.list().await;

    let added = registry.toggle(&badge(440, "Level 1", true)).await.unwrap();
    assert!(added.is_added());
    assert!(registry.is_favorite(440, true).await);
    assert!(!registry.is_favorite(440, false).await);

    let removed = registry.toggle(&badge(440, "Level 1", true)).await.unwrap();
    assert_eq!(removed, ToggleOutcome::Removed);
    assert_eq!(registry.list().await, before);
}

#[tokio::test]
async fn test_variants_are_separate_favorites() {
    let registry = FavoritesRegistry::new(memory_cache());

    registry.toggle(&badge(440, "Level 1", false)).await.unwrap();
    registry.toggle(&badge(440, "Foil", true)).await.unwrap();

    let mut ids: Vec<String> = registry.list().await.into_iter().map(|f| f.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["440_foil", "440_regular"]);
}

#[tokio::test]
async fn test_toggle_merges_cached_badge_data() {
    let cache = memory_cache();
    let service = service(
        cache.clone(),
        FakeSource::with_body(tf2_listing()),
        Arc::default(),
        0,
    );
    service.fetch_badge_data(440).await.unwrap();
    let registry = FavoritesRegistry::new(cache);

    // the page only knows the name and variant
    let scraped = BadgeRecord::new(440, "Level 2", 2);
    let outcome = registry.toggle(&scraped).await.unwrap();

    let ToggleOutcome::Added(favorite) = outcome else {
        panic!("expected the favorite to be added");
    };
    assert_eq!(favorite.id, "440_regular");
    assert_eq!(favorite.badge_image, "l2.png");
    assert_eq!(favorite.app_name, "Team Fortress 2");
    assert_eq!(registry.list().await, vec![favorite]);
}

#[tokio::test]
async fn test_bulk_import_overwrites_and_keeps_others() {
    let registry = FavoritesRegistry::new(memory_cache());
    registry.toggle(&badge(10, "Level 1", false)).await.unwrap();
    registry.toggle(&badge(20, "Level 1", false)).await.unwrap();

    let mut renamed = FavoriteRecord::from_badge(&badge(20, "Level 1", false));
    renamed.app_name = "Renamed".to_string();
    let fresh = FavoriteRecord::from_badge(&badge(30, "Foil", true));

    let written = registry.bulk_import(vec![renamed.clone(), fresh.clone()]).await;
    assert_eq!(written, 2);

    let favorites = registry.list().await;
    assert_eq!(favorites.len(), 3);
    assert!(favorites.contains(&renamed));
    assert!(favorites.contains(&fresh));
    assert!(registry.is_favorite(10, false).await);
}

#[tokio::test]
async fn test_export_import_round_trip_between_stores() {
    let source = FavoritesRegistry::new(memory_cache());
    source.toggle(&badge(440, "Level 1", false)).await.unwrap();
    source.toggle(&badge(730, "Foil", true)).await.unwrap();
    let exported = source.export_json().await.unwrap();
    assert!(exported.contains("\"appId\": 440"));

    let target = FavoritesRegistry::new(memory_cache());
    assert_eq!(target.import_json(&exported).await.unwrap(), 2);
    assert_eq!(target.list().await, source.list().await);
}

#[tokio::test]
async fn test_import_rejects_malformed_json() {
    let registry = FavoritesRegistry::new(memory_cache());
    assert!(registry.import_json("{\"not\": \"an array\"}").await.is_err());
    assert!(registry.list().await.is_empty());
}

#[tokio::test]
async fn test_import_skips_invalid_elements() {
    let registry = FavoritesRegistry::new(memory_cache());
    let json = r#"[
        {"appId": 440, "name": "Level 1", "isFoil": false},
        {"appId": "not a number", "name": "Broken"},
        {"appId": 730, "name": "Foil", "isFoil": true}
    ]"#;

    assert_eq!(registry.import_json(json).await.unwrap(), 2);

    let ids: Vec<String> = registry.list().await.into_iter().map(|f| f.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"440_regular".to_string()));
    assert!(ids.contains(&"730_foil".to_string()));
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let registry = FavoritesRegistry::new(memory_cache());
    registry.toggle(&badge(440, "Level 1", false)).await.unwrap();

    assert!(registry.remove("440_regular").await);
    assert!(registry.remove("440_regular").await);
    assert!(registry.list().await.is_empty());
}

#[tokio::test]
async fn test_unavailable_store() {
    let registry = FavoritesRegistry::new(unavailable_cache());

    assert!(registry.toggle(&badge(440, "Level 1", false)).await.is_err());
    assert!(registry.list().await.is_empty());
    assert_eq!(registry.bulk_import(vec![FavoriteRecord::from_badge(&badge(1, "x", false))]).await, 0);
    assert!(!registry.remove("1_regular").await);
}

#[tokio::test]
async fn test_listed_favorites_sort() {
    let registry = FavoritesRegistry::new(memory_cache());
    for (app_id, foil) in [(730, false), (440, true), (570, false)] {
        registry.toggle(&badge(app_id, "Level 1", foil)).await.unwrap();
    }

    let mut favorites = registry.list().await;
    FavoritesSortOrder::FoilFirst.apply(&mut favorites);
    assert!(favorites[0].is_foil);

    FavoritesSortOrder::AppIdAsc.apply(&mut favorites);
    let app_ids: Vec<u32> = favorites.iter().map(|f| f.app_id).collect();
    assert_eq!(app_ids, vec![440, 570, 730]);
}
