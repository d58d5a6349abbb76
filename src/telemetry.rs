//! Tracing subscriber setup

use config::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::BadgeHausError;

/// Pick the filter directive: `RUST_LOG`, then the configured filter, then verbosity
pub fn filter_directive(config: &LoggingConfig, env_directive: Option<String>) -> String {
    env_directive
        .filter(|directive| !directive.trim().is_empty())
        .or_else(|| config.filter.clone())
        .unwrap_or_else(|| {
            if config.verbose {
                "badgehaus=debug,cache_system=debug,dispatcher=debug".to_string()
            } else {
                "badgehaus=info,cache_system=info,dispatcher=info".to_string()
            }
        })
}

/// Install the global fmt subscriber
///
/// Fails instead of panicking when a subscriber is already installed or the
/// directive does not parse.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), BadgeHausError> {
    let directive = filter_directive(config, std::env::var("RUST_LOG").ok());
    let filter =
        EnvFilter::try_new(&directive).map_err(|e| BadgeHausError::Telemetry(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| BadgeHausError::Telemetry(e.to_string()))
}
