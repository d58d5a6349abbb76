//! Error types for the BadgeHaus crate
//!
//! This module aggregates the errors of every component so the coordinator
//! can surface them through one type.

use thiserror::Error;

use crate::client::BadgeApiError;
use cache_system::CacheError;
use config::ConfigError;
use dispatcher::DispatchError;

#[derive(Error, Debug)]
pub enum BadgeHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache store error: {0}")]
    Cache(#[from] CacheError),

    #[error("Request queue error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Badge API error: {0}")]
    BadgeApi(#[from] BadgeApiError),

    #[error("Failed to initialise tracing: {0}")]
    Telemetry(String),
}
