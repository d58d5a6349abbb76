//! Fetch badges for the app ids given on the command line
//!
//! ```text
//! BADGEHAUS_API_KEY=... cargo run --example fetch_badges -- 440 730
//! ```

use badgehaus::prelude::*;
use badgehaus::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    let app_ids: Vec<u32> = std::env::args()
        .skip(1)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    if app_ids.is_empty() {
        eprintln!("usage: fetch_badges <app id>...");
        return Ok(());
    }

    let cdn = config.api.image_cdn_url.clone();
    let haus = BadgeHaus::new(config)?;
    let swept = haus.startup().await;
    println!("Removed {} expired cache entries", swept);

    haus.signals().add_callback(|event: &StoreEvent| {
        println!("  [{:?}] {} {}", event.event_type, event.partition, event.key.as_deref().unwrap_or(""));
    });

    // Requests are queued together; the queue spaces them out.
    let fetches = app_ids.iter().map(|&app_id| {
        let badges = haus.badges().clone();
        tokio::spawn(async move { (app_id, badges.fetch_badge_record(app_id).await) })
    });
    let mut results = Vec::new();
    for fetch in fetches.collect::<Vec<_>>() {
        results.push(fetch.await?);
    }

    for (app_id, record) in results {
        let Some(record) = record else {
            println!("{}: could not load badge data", app_id);
            continue;
        };

        println!("{} ({})", record.app_name, app_id);
        for badge in sorted_canonical(&record.badges) {
            let kind = if badge.is_foil { "foil" } else { "normal" };
            let scarcity = badge
                .scarcity
                .map(|s| format!("{:.0}", s))
                .unwrap_or_else(|| "N/A".to_string());
            println!(
                "  {:<40} {:<6} level {:<3} scarcity {:<8} {}",
                badge.name,
                kind,
                badge.base_level,
                scarcity,
                badge.image_url(&cdn).unwrap_or_default()
            );
        }
    }

    let favorites = haus.favorites().list().await;
    println!("{} favorite(s) saved", favorites.len());

    haus.shutdown().await;
    Ok(())
}
