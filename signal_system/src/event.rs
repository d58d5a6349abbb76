//! Store event types and definitions
//!
//! This module defines the structure of store events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};

/// Store event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Put,
    Delete,
    Sweep,
}

/// Store event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEvent {
    /// Event type
    pub event_type: EventType,
    /// Partition the change happened in
    pub partition: String,
    /// Encoded key of the affected entry (absent for sweeps)
    pub key: Option<String>,
    /// Number of entries affected
    pub affected: u64,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl StoreEvent {
    pub fn new(event_type: EventType, partition: impl Into<String>) -> Self {
        Self {
            event_type,
            partition: partition.into(),
            key: None,
            affected: 1,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Key decoded back into JSON, if it was a JSON-encoded key
    pub fn key_value(&self) -> Option<serde_json::Value> {
        self.key
            .as_deref()
            .and_then(|key| serde_json::from_str(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let event = StoreEvent::new(EventType::Put, "favorites").with_key("\"440_foil\"");

        assert_eq!(event.event_type, EventType::Put);
        assert_eq!(event.partition, "favorites");
        assert_eq!(event.affected, 1);
        assert_eq!(event.key_value(), Some(serde_json::json!("440_foil")));
    }

    #[test]
    fn test_sweep_has_no_key() {
        let event = StoreEvent::new(EventType::Sweep, "badge_data").with_affected(12);

        assert!(event.key.is_none());
        assert!(event.key_value().is_none());
        assert_eq!(event.affected, 12);
    }
}
