//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during cache store operations and SQLite interactions.

use crate::validation::ValidationError;
use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Value for partition '{partition}' has no usable '{field}' key")]
    MissingKey { partition: String, field: String },

    #[error("Invalid partition name: {0}")]
    InvalidPartition(#[from] ValidationError),

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),
}

impl CacheError {
    /// True when the store itself could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable(_))
    }
}
