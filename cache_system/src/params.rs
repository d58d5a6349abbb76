//! Partition declarations
//!
//! This module defines the PartitionSpec struct used to declare the
//! named partitions of the store up front, and the CacheKey type
//! entries are addressed by.

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// How entries of a partition age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Use the store-wide TTL from `CacheConfig`
    Default,
    /// Use a partition-specific TTL
    After(Duration),
    /// Entries never go stale and are never swept
    Never,
}

/// Declaration of one named partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    /// Partition name, also used as the table name
    pub name: String,
    /// Field of the stored value that holds its key
    pub key_field: String,
    pub expiry: Expiry,
}

impl PartitionSpec {
    pub fn new(name: &str, key_field: &str) -> Self {
        Self {
            name: name.to_string(),
            key_field: key_field.to_string(),
            expiry: Expiry::Default,
        }
    }

    pub fn with_expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = expiry;
        self
    }

    /// Effective TTL for this partition, `None` when entries never expire
    pub fn ttl(&self, default_ttl: Duration) -> Option<Duration> {
        match self.expiry {
            Expiry::Default => Some(default_ttl),
            Expiry::After(ttl) => Some(ttl),
            Expiry::Never => None,
        }
    }
}

/// Key of a stored entry, either an integer or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Int(i64),
    Text(String),
}

impl CacheKey {
    /// Read a key out of a JSON value
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(CacheKey::Int),
            Value::String(s) => Some(CacheKey::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CacheKey::Int(i) => Value::from(*i),
            CacheKey::Text(s) => Value::String(s.clone()),
        }
    }

    /// Storage form of the key; `440` and `"440"` encode differently
    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }

    pub fn decode(encoded: &str) -> Option<Self> {
        serde_json::from_str::<Value>(encoded)
            .ok()
            .and_then(|value| Self::from_json(&value))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Int(i) => write!(f, "{}", i),
            CacheKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CacheKey {
    fn from(value: i64) -> Self {
        CacheKey::Int(value)
    }
}

impl From<u32> for CacheKey {
    fn from(value: u32) -> Self {
        CacheKey::Int(i64::from(value))
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::Text(value.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey::Text(value)
    }
}

impl From<&String> for CacheKey {
    fn from(value: &String) -> Self {
        CacheKey::Text(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_and_text_keys_encode_differently() {
        let int_key = CacheKey::from(440u32);
        let text_key = CacheKey::from("440");

        assert_ne!(int_key.encode(), text_key.encode());
        assert_eq!(int_key.encode(), "440");
        assert_eq!(text_key.encode(), "\"440\"");
        assert_eq!(CacheKey::decode(&text_key.encode()), Some(text_key));
    }

    #[test]
    fn test_from_json_rejects_non_scalar_keys() {
        assert_eq!(CacheKey::from_json(&json!(7)), Some(CacheKey::Int(7)));
        assert_eq!(CacheKey::from_json(&json!(1.5)), None);
        assert_eq!(CacheKey::from_json(&json!(null)), None);
        assert_eq!(CacheKey::from_json(&json!({"id": 1})), None);
    }

    #[test]
    fn test_partition_ttl() {
        let default_ttl = Duration::from_secs(60);

        assert_eq!(
            PartitionSpec::new("badge_data", "app_id").ttl(default_ttl),
            Some(default_ttl)
        );
        assert_eq!(
            PartitionSpec::new("favorites", "id")
                .with_expiry(Expiry::Never)
                .ttl(default_ttl),
            None
        );
        assert_eq!(
            PartitionSpec::new("short", "id")
                .with_expiry(Expiry::After(Duration::from_secs(5)))
                .ttl(default_ttl),
            Some(Duration::from_secs(5))
        );
    }
}
