//! # Configuration Management for BadgeHaus
//!
//! This crate provides centralized configuration structures for all BadgeHaus components:
//! the remote badge API, the persistent cache store, the request queue and logging.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AppConfig, CacheConfig, QueueConfig};
//!
//! let mut config = AppConfig::default();
//! config.cache = CacheConfig::new("sqlite::memory:".to_string(), 3600);
//! config.queue = QueueConfig::new(1500);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [api]
//! badge_list_url = "https://api.steamsets.com/v1/app.listBadges"
//! api_key = "your-key"
//! community_url = "https://steamcommunity.com"
//!
//! [cache]
//! database_url = "sqlite:badgehaus.db"
//! ttl_seconds = 31536000
//!
//! [queue]
//! min_spacing_ms = 3000
//!
//! [logging]
//! verbose = false
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from BADGEHAUS_CONFIG, ./badgehaus.toml or defaults
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::{env, path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./badgehaus.toml";
const CONFIG_PATH_ENV: &str = "BADGEHAUS_CONFIG";
const API_KEY_ENV: &str = "BADGEHAUS_API_KEY";

const ONE_YEAR_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub queue: QueueConfig,
    pub logging: LoggingConfig,
}

/// Remote endpoints and credential
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Badge-listing endpoint (POST, bearer credential)
    pub badge_list_url: String,
    /// Bearer credential for the badge-listing endpoint
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// Base URL of the community site serving crafted-level lookups
    pub community_url: String,
    /// Base URL used to turn badge image references into display URLs
    pub image_cdn_url: String,
    pub user_agent: String,
}

/// Persistent cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite URL (`sqlite:path.db`, `sqlite::memory:`) or a bare file path
    pub database_url: String,
    /// Age after which badge entries read as absent
    pub ttl_seconds: u64,
}

/// Request queue configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Minimum spacing between two dispatches, zero disables pacing
    pub min_spacing_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    /// Explicit `EnvFilter` directive, takes precedence over `verbose`
    pub filter: Option<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from))
}

impl AppConfig {
    /// Load configuration from the TOML file named in the environment or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, everything has a default
        let _ = dotenvy::dotenv();

        let mut config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::from_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.api.api_key = Some(SecretString::from(key));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.badge_list_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Badge list URL cannot be empty".to_string(),
            ));
        }
        if self.api.community_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Community URL cannot be empty".to_string(),
            ));
        }
        if self.api.image_cdn_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Image CDN URL cannot be empty".to_string(),
            ));
        }

        if self.cache.database_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Cache database_url cannot be empty".to_string(),
            ));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Cache ttl_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            badge_list_url: "https://api.steamsets.com/v1/app.listBadges".to_string(),
            api_key: None,
            community_url: "https://steamcommunity.com".to_string(),
            image_cdn_url:
                "https://cdn.cloudflare.steamstatic.com/steamcommunity/public/images/items"
                    .to_string(),
            user_agent: concat!("badgehaus/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(database_url: String, ttl_seconds: u64) -> Self {
        Self {
            database_url,
            ttl_seconds,
        }
    }

    /// Get TTL as Duration
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:badgehaus.db".to_string(),
            ttl_seconds: ONE_YEAR_SECONDS,
        }
    }
}

impl QueueConfig {
    /// Create a new queue configuration
    pub fn new(min_spacing_ms: u64) -> Self {
        Self { min_spacing_ms }
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_spacing_ms: 3000,
        }
    }
}
