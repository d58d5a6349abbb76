//! Crafted badge levels
//!
//! The community site reports which badge level the signed-in user has
//! crafted for an app, once for the normal badge and once (with
//! `?border=1`) for the foil badge. An `eresult` other than 1 means "no
//! data" and is not an error.

use async_trait::async_trait;
use config::ApiConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::badges::BadgeRecord;
use crate::badges::classify::is_high_level_family;
use crate::client::BadgeApiError;

/// What the user crafted for one badge variant; level 0 when nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftedBadge {
    pub level: u32,
    pub name: Option<String>,
    pub icon_url: Option<String>,
}

impl CraftedBadge {
    pub fn is_crafted(&self) -> bool {
        self.level > 0
    }

    /// Last path segment of the icon URL, usable as an image reference
    pub fn icon_ref(&self) -> Option<&str> {
        self.icon_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|segment| !segment.is_empty())
    }

    /// Read a `{ eresult, badgedata: { level, name, iconurl } }` body
    pub fn from_badge_info(body: &Value) -> Option<Self> {
        if body.get("eresult").and_then(Value::as_i64) != Some(1) {
            return None;
        }
        let data = body.get("badgedata")?;

        let level = match data.get("level") {
            Some(Value::Number(n)) => n.as_u64().and_then(|l| u32::try_from(l).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .unwrap_or(0);
        let text = |field: &str| {
            data.get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            level,
            name: text("name"),
            icon_url: text("iconurl"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CraftedLevels {
    pub normal: CraftedBadge,
    pub foil: CraftedBadge,
}

impl CraftedLevels {
    pub fn variant(&self, is_foil: bool) -> &CraftedBadge {
        if is_foil { &self.foil } else { &self.normal }
    }

    pub fn level_for(&self, is_foil: bool) -> u32 {
        self.variant(is_foil).level
    }
}

/// Anything that can report crafted levels; never fails, "no data" is level 0
#[async_trait]
pub trait CraftedLevelSource: Send + Sync {
    async fn crafted_levels(&self, app_id: u32) -> CraftedLevels;
}

/// HTTP client for the community badge-info endpoint
///
/// The endpoint answers for the signed-in user, so the supplied
/// [`reqwest::Client`] must carry that session.
pub struct CommunityClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommunityClient {
    pub fn new(config: &ApiConfig) -> Result<Self, BadgeApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.community_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn badge_info_url(&self, app_id: u32, foil: bool) -> String {
        let url = format!("{}/my/ajaxgetbadgeinfo/{}", self.base_url, app_id);
        if foil { format!("{}?border=1", url) } else { url }
    }

    async fn badge_info(&self, app_id: u32, foil: bool) -> Result<Option<CraftedBadge>, BadgeApiError> {
        let response = self
            .client
            .get(self.badge_info_url(app_id, foil))
            .send()
            .await?;
        let body: Value = serde_json::from_str(&response.text().await?)?;
        crate::trace_log!(app_id, foil, body = %body, "raw badge info");

        Ok(CraftedBadge::from_badge_info(&body))
    }

    async fn badge_info_or_default(&self, app_id: u32, foil: bool) -> CraftedBadge {
        match self.badge_info(app_id, foil).await {
            Ok(info) => info.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(app_id, foil, error = %e, "crafted level lookup failed");
                CraftedBadge::default()
            }
        }
    }
}

#[async_trait]
impl CraftedLevelSource for CommunityClient {
    async fn crafted_levels(&self, app_id: u32) -> CraftedLevels {
        let (normal, foil) = tokio::join!(
            self.badge_info_or_default(app_id, false),
            self.badge_info_or_default(app_id, true),
        );
        tracing::debug!(app_id, normal = normal.level, foil = foil.level, "crafted levels");
        CraftedLevels { normal, foil }
    }
}

/// How crafted status is derived from base and crafted levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraftedRule {
    /// Event-style families: a level must have been crafted and match
    EventFamily,
    /// Regular families: levels must match
    Regular,
}

impl CraftedRule {
    pub fn for_family(high_level_family: bool) -> Self {
        if high_level_family {
            CraftedRule::EventFamily
        } else {
            CraftedRule::Regular
        }
    }

    pub fn is_crafted(self, base_level: u32, crafted_level: u32) -> bool {
        match self {
            CraftedRule::EventFamily => crafted_level > 0 && base_level == crafted_level,
            CraftedRule::Regular => base_level == crafted_level,
        }
    }
}

/// Set `crafted_level` and `is_crafted` on every badge of one family
pub fn annotate_crafted(badges: &mut [BadgeRecord], levels: &CraftedLevels) {
    let rule = CraftedRule::for_family(is_high_level_family(badges.iter().map(|b| b.base_level)));
    for badge in badges.iter_mut() {
        badge.crafted_level = levels.level_for(badge.is_foil);
        badge.is_crafted = rule.is_crafted(badge.base_level, badge.crafted_level);
    }
}

/// The badges to feature for an app: what was crafted, else a placeholder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CraftedShowcase {
    pub normal: Option<BadgeRecord>,
    pub foil: Option<BadgeRecord>,
}

/// An empty family has nothing to feature, crafted or not.
pub fn crafted_showcase(app_id: u32, badges: &[BadgeRecord], levels: &CraftedLevels) -> CraftedShowcase {
    if badges.is_empty() {
        return CraftedShowcase::default();
    }

    let normals: Vec<&BadgeRecord> = badges.iter().filter(|b| !b.is_foil).collect();
    let foils: Vec<&BadgeRecord> = badges.iter().filter(|b| b.is_foil).collect();

    let normal = if levels.normal.is_crafted() {
        let template = normals
            .iter()
            .find(|b| b.base_level == levels.normal.level)
            .or_else(|| normals.first())
            .copied();
        Some(crafted_from(app_id, template, &levels.normal, false))
    } else {
        // first of the highest level wins
        normals
            .iter()
            .fold(None::<&BadgeRecord>, |best, b| match best {
                Some(top) if top.base_level >= b.base_level => Some(top),
                _ => Some(b),
            })
            .map(|b| placeholder_from(app_id, b))
    };

    let foil = if levels.foil.is_crafted() {
        Some(crafted_from(app_id, foils.first().copied(), &levels.foil, true))
    } else {
        foils.first().map(|b| placeholder_from(app_id, b))
    };

    CraftedShowcase { normal, foil }
}

fn crafted_from(
    app_id: u32,
    template: Option<&BadgeRecord>,
    crafted: &CraftedBadge,
    is_foil: bool,
) -> BadgeRecord {
    let mut record = template
        .cloned()
        .unwrap_or_else(|| BadgeRecord::new(app_id, crate::badges::UNKNOWN_BADGE, crafted.level));
    record.app_id = app_id;
    record.is_foil = is_foil;
    record.is_crafted = true;
    record.crafted_level = crafted.level;
    if let Some(name) = &crafted.name {
        record.name = name.clone();
    }
    if let Some(icon) = crafted.icon_ref() {
        record.badge_image = icon.to_string();
    }
    record
}

fn placeholder_from(app_id: u32, template: &BadgeRecord) -> BadgeRecord {
    let mut record = template.clone();
    record.app_id = app_id;
    record.is_crafted = false;
    record.crafted_level = 0;
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn levels(normal: u32, foil: u32) -> CraftedLevels {
        CraftedLevels {
            normal: CraftedBadge {
                level: normal,
                ..Default::default()
            },
            foil: CraftedBadge {
                level: foil,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_badge_info_parsing() {
        let crafted = CraftedBadge::from_badge_info(&json!({
            "eresult": 1,
            "badgedata": {
                "level": 3,
                "name": "Mann Co. Regular",
                "iconurl": "https://cdn.example.com/items/440/abc.png"
            }
        }))
        .unwrap();

        assert_eq!(crafted.level, 3);
        assert_eq!(crafted.name.as_deref(), Some("Mann Co. Regular"));
        assert_eq!(crafted.icon_ref(), Some("abc.png"));
    }

    #[test]
    fn test_badge_info_without_data() {
        assert_eq!(CraftedBadge::from_badge_info(&json!({"eresult": 15})), None);
        assert_eq!(CraftedBadge::from_badge_info(&json!({"eresult": 1})), None);
        assert_eq!(
            CraftedBadge::from_badge_info(&json!({"eresult": 1, "badgedata": {}})),
            Some(CraftedBadge::default())
        );
    }

    #[test]
    fn test_badge_info_url() {
        let config = ApiConfig {
            community_url: "https://community.example.com/".to_string(),
            ..Default::default()
        };
        let client = CommunityClient::with_client(reqwest::Client::new(), &config);

        assert_eq!(
            client.badge_info_url(440, false),
            "https://community.example.com/my/ajaxgetbadgeinfo/440"
        );
        assert_eq!(
            client.badge_info_url(440, true),
            "https://community.example.com/my/ajaxgetbadgeinfo/440?border=1"
        );
    }

    #[test]
    fn test_regular_family_rule() {
        let mut badges: Vec<BadgeRecord> =
            (1..=5).map(|l| BadgeRecord::new(440, format!("Level {}", l), l)).collect();
        badges.push(BadgeRecord::new(440, "Foil", 1).foil(true));

        annotate_crafted(&mut badges, &levels(3, 0));

        let crafted: Vec<u32> = badges
            .iter()
            .filter(|b| b.is_crafted)
            .map(|b| b.base_level)
            .collect();
        assert_eq!(crafted, vec![3]);
        assert!(badges.iter().filter(|b| !b.is_foil).all(|b| b.crafted_level == 3));
        assert_eq!(badges[5].crafted_level, 0);
        assert!(!badges[5].is_crafted);
    }

    #[test]
    fn test_event_family_rule() {
        let mut badges: Vec<BadgeRecord> =
            (1..=10).map(|l| BadgeRecord::new(570, format!("Event {}", l), l)).collect();
        badges.push(BadgeRecord::new(570, "Event - Foil 1", 1).foil(true));

        annotate_crafted(&mut badges, &levels(8, 1));

        assert!(badges[7].is_crafted);
        assert_eq!(badges.iter().filter(|b| b.is_crafted).count(), 2);
        assert!(badges[10].is_crafted);
    }

    #[test]
    fn test_rules_differ_on_zero_levels() {
        assert!(!CraftedRule::EventFamily.is_crafted(0, 0));
        assert!(CraftedRule::Regular.is_crafted(0, 0));
        assert!(!CraftedRule::Regular.is_crafted(1, 0));
        assert_eq!(CraftedRule::for_family(true), CraftedRule::EventFamily);
    }

    #[test]
    fn test_showcase_crafted() {
        let badges = vec![
            BadgeRecord::new(440, "Level 1", 1).with_image("one.png"),
            BadgeRecord::new(440, "Level 2", 2).with_image("two.png"),
            BadgeRecord::new(440, "Foil", 1).foil(true).with_image("foil.png"),
        ];
        let mut crafted = levels(2, 1);
        crafted.normal.name = Some("Crafted Two".to_string());
        crafted.foil.icon_url = Some("https://cdn.example.com/shiny.png".to_string());

        let showcase = crafted_showcase(440, &badges, &crafted);

        let normal = showcase.normal.unwrap();
        assert!(normal.is_crafted);
        assert_eq!(normal.base_level, 2);
        assert_eq!(normal.name, "Crafted Two");
        assert_eq!(normal.badge_image, "two.png");

        let foil = showcase.foil.unwrap();
        assert!(foil.is_crafted && foil.is_foil);
        assert_eq!(foil.badge_image, "shiny.png");
    }

    #[test]
    fn test_showcase_placeholders() {
        let badges = vec![
            BadgeRecord::new(440, "Level 1", 1),
            BadgeRecord::new(440, "Level 5", 5),
            BadgeRecord::new(440, "Level 3", 3),
        ];

        let showcase = crafted_showcase(440, &badges, &CraftedLevels::default());

        let normal = showcase.normal.unwrap();
        assert!(!normal.is_crafted);
        assert_eq!(normal.base_level, 5);
        assert_eq!(showcase.foil, None);
    }

    #[test]
    fn test_showcase_empty_family() {
        let showcase = crafted_showcase(440, &[], &levels(2, 1));

        assert_eq!(showcase, CraftedShowcase::default());
    }

    #[test]
    fn test_showcase_crafted_without_normal_template() {
        let badges = vec![BadgeRecord::new(440, "Foil", 1).foil(true)];

        let showcase = crafted_showcase(440, &badges, &levels(2, 0));

        let normal = showcase.normal.unwrap();
        assert!(normal.is_crafted && !normal.is_foil);
        assert_eq!(normal.crafted_level, 2);
        assert!(showcase.foil.is_some());
    }

    #[test]
    fn test_showcase_placeholder_keeps_first_of_highest() {
        let badges = vec![
            BadgeRecord::new(440, "first-5", 5),
            BadgeRecord::new(440, "Level 2", 2),
            BadgeRecord::new(440, "second-5", 5),
        ];

        let showcase = crafted_showcase(440, &badges, &CraftedLevels::default());

        assert_eq!(showcase.normal.unwrap().name, "first-5");
    }
}
