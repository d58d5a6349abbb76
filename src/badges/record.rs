use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNKNOWN_BADGE: &str = "Unknown Badge";
pub const UNKNOWN_GAME: &str = "Unknown Game";

fn unknown_badge() -> String {
    UNKNOWN_BADGE.to_string()
}

fn first_level() -> u32 {
    1
}

/// One badge of an app, normalized from the remote listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    pub app_id: u32,
    #[serde(default = "unknown_badge")]
    pub name: String,
    /// Image reference, either a bare hash or a full URL; may be empty
    #[serde(default)]
    pub badge_image: String,
    #[serde(default, rename = "communityitemid")]
    pub community_item_id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub is_foil: bool,
    #[serde(default = "first_level")]
    pub base_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scarcity: Option<f64>,
    #[serde(default)]
    pub is_crafted: bool,
    #[serde(default)]
    pub crafted_level: u32,
    #[serde(default)]
    pub is_current: bool,
    /// Source fields with no dedicated slot, kept as received
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BadgeRecord {
    pub fn new(app_id: u32, name: impl Into<String>, base_level: u32) -> Self {
        Self {
            app_id,
            name: name.into(),
            badge_image: String::new(),
            community_item_id: String::new(),
            app_name: UNKNOWN_GAME.to_string(),
            is_foil: false,
            base_level: base_level.max(1),
            scarcity: None,
            is_crafted: false,
            crafted_level: 0,
            is_current: false,
            extra: Map::new(),
        }
    }

    pub fn foil(mut self, is_foil: bool) -> Self {
        self.is_foil = is_foil;
        self
    }

    pub fn current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }

    pub fn crafted(mut self, is_crafted: bool) -> Self {
        self.is_crafted = is_crafted;
        self
    }

    pub fn with_image(mut self, badge_image: impl Into<String>) -> Self {
        self.badge_image = badge_image.into();
        self
    }

    /// Display URL for the badge image
    ///
    /// Full URLs are returned unchanged, bare references are resolved
    /// against `cdn_base`. `None` when the record has no image.
    pub fn image_url(&self, cdn_base: &str) -> Option<String> {
        let image = self.badge_image.trim();
        if image.is_empty() {
            return None;
        }
        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(image.to_string());
        }
        Some(format!(
            "{}/{}/{}",
            cdn_base.trim_end_matches('/'),
            self.app_id,
            image
        ))
    }
}

/// Payload of the badge partition: every badge of one app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCacheRecord {
    pub app_id: u32,
    pub app_name: String,
    pub badges: Vec<BadgeRecord>,
}
