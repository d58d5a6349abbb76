//! Response envelopes of the badge-listing endpoint
//!
//! The endpoint answers either `{ badges, appName? }` or
//! `{ response: { badges, appName? } }`. Decoding tries the flat shape
//! first, then the nested one.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::classify::classify_foils;
use super::record::{BadgeCacheRecord, BadgeRecord, UNKNOWN_BADGE, UNKNOWN_GAME};
use crate::client::BadgeApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BadgeEnvelope {
    Flat(BadgeListing),
    Nested { response: BadgeListing },
}

impl BadgeEnvelope {
    pub fn decode(value: Value) -> Result<Self, BadgeApiError> {
        serde_json::from_value(value).map_err(|_| {
            BadgeApiError::InvalidResponseFormat(
                "expected a `badges` array at the top level or under `response`".to_string(),
            )
        })
    }

    pub fn into_listing(self) -> BadgeListing {
        match self {
            BadgeEnvelope::Flat(listing) => listing,
            BadgeEnvelope::Nested { response } => response,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgeListing {
    pub badges: Vec<RawBadge>,
    #[serde(default, rename = "appName")]
    pub app_name: Option<Value>,
    #[serde(default)]
    pub game_name: Option<Value>,
}

impl BadgeListing {
    /// Collection-level display name
    pub fn resolved_app_name(&self) -> String {
        non_empty_text(self.app_name.as_ref())
            .or_else(|| non_empty_text(self.game_name.as_ref()))
            .or_else(|| self.badges.first().and_then(RawBadge::app_name))
            .unwrap_or(UNKNOWN_GAME)
            .to_string()
    }

    /// Turn the raw listing into the cached form for `app_id`
    pub fn normalize(self, app_id: u32) -> BadgeCacheRecord {
        let app_name = self.resolved_app_name();
        let mut badges: Vec<BadgeRecord> = self
            .badges
            .into_iter()
            .map(|raw| raw.into_record(app_id, &app_name))
            .collect();
        classify_foils(&mut badges);

        BadgeCacheRecord {
            app_id,
            app_name,
            badges,
        }
    }
}

/// Source fields that feed a dedicated `BadgeRecord` slot
const CONSUMED_FIELDS: &[&str] = &[
    "appId",
    "appid",
    "app_id",
    "name",
    "title",
    "image_hash",
    "badgeImage",
    "image",
    "communityitemid",
    "border_color",
    "appName",
    "game_name",
    "baseLevel",
    "foil",
    "isFoil",
    "scarcity",
    "isCurrent",
    "isCrafted",
    "craftedLevel",
];

/// One badge exactly as the endpoint sent it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawBadge(pub Map<String, Value>);

impl RawBadge {
    fn first_text(&self, fields: &[&str]) -> Option<&str> {
        fields
            .iter()
            .find_map(|field| non_empty_text(self.0.get(*field)))
    }

    pub fn name(&self) -> Option<&str> {
        self.first_text(&["name", "title"])
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.first_text(&["image_hash", "badgeImage", "image"])
    }

    pub fn app_name(&self) -> Option<&str> {
        self.first_text(&["appName", "game_name"])
    }

    pub fn community_item_id(&self) -> Option<String> {
        ["communityitemid", "border_color"]
            .iter()
            .find_map(|field| match self.0.get(*field) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Base level, at least 1; unparseable or missing levels read as 1
    pub fn base_level(&self) -> u32 {
        let level = match self.0.get("baseLevel") {
            Some(Value::Number(n)) => n.as_f64().map(|f| f.trunc() as i64),
            Some(Value::String(s)) => leading_integer(s),
            _ => None,
        };
        match level {
            Some(level) if level >= 1 => u32::try_from(level).unwrap_or(u32::MAX),
            _ => 1,
        }
    }

    pub fn explicit_foil(&self) -> bool {
        ["foil", "isFoil"]
            .iter()
            .any(|field| is_truthy(self.0.get(*field)))
    }

    pub fn scarcity(&self) -> Option<f64> {
        match self.0.get("scarcity") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_current(&self) -> bool {
        is_truthy(self.0.get("isCurrent"))
    }

    /// Normalize into a record owned by `app_id`; foil status is only the explicit flag here
    pub fn into_record(self, app_id: u32, app_name: &str) -> BadgeRecord {
        let name = self.name().unwrap_or(UNKNOWN_BADGE).to_string();
        let badge_image = self.image_ref().unwrap_or_default().to_string();
        let community_item_id = self.community_item_id().unwrap_or_default();
        let base_level = self.base_level();
        let is_foil = self.explicit_foil();
        let scarcity = self.scarcity();
        let is_current = self.is_current();

        let mut extra = self.0;
        for field in CONSUMED_FIELDS {
            extra.remove(*field);
        }

        BadgeRecord {
            app_id,
            name,
            badge_image,
            community_item_id,
            app_name: app_name.to_string(),
            is_foil,
            base_level,
            scarcity,
            is_crafted: false,
            crafted_level: 0,
            is_current,
            extra,
        }
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

/// Integer prefix of a string, `"3 (max)"` reads as 3
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
