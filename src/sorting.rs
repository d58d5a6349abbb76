//! Display ordering for badge lists and favorites

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::badges::BadgeRecord;
use crate::favorites::FavoriteRecord;

/// Fields the canonical order looks at
pub trait BadgeOrdering {
    fn app_id(&self) -> u32;
    fn is_current(&self) -> bool;
    fn is_foil(&self) -> bool;
    fn base_level(&self) -> u32;
    fn is_crafted(&self) -> bool;
}

impl BadgeOrdering for BadgeRecord {
    fn app_id(&self) -> u32 {
        self.app_id
    }
    fn is_current(&self) -> bool {
        self.is_current
    }
    fn is_foil(&self) -> bool {
        self.is_foil
    }
    fn base_level(&self) -> u32 {
        self.base_level
    }
    fn is_crafted(&self) -> bool {
        self.is_crafted
    }
}

// Favorites carry no level or crafted state.
impl BadgeOrdering for FavoriteRecord {
    fn app_id(&self) -> u32 {
        self.app_id
    }
    fn is_current(&self) -> bool {
        false
    }
    fn is_foil(&self) -> bool {
        self.is_foil
    }
    fn base_level(&self) -> u32 {
        0
    }
    fn is_crafted(&self) -> bool {
        false
    }
}

fn group<T: BadgeOrdering>(item: &T) -> u8 {
    if item.is_current() {
        0
    } else if item.is_foil() {
        2
    } else {
        1
    }
}

/// Current first, then normal badges, then foils; each group by ascending
/// level with crafted before uncrafted
pub fn canonical_cmp<T: BadgeOrdering>(a: &T, b: &T) -> Ordering {
    match (group(a), group(b)) {
        (0, 0) => Ordering::Equal,
        (ga, gb) if ga != gb => ga.cmp(&gb),
        _ => a
            .base_level()
            .cmp(&b.base_level())
            .then_with(|| b.is_crafted().cmp(&a.is_crafted())),
    }
}

/// Stable sort into canonical order
pub fn sort_canonical<T: BadgeOrdering>(items: &mut [T]) {
    items.sort_by(canonical_cmp);
}

pub fn sorted_canonical<T: BadgeOrdering + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sort_canonical(&mut sorted);
    sorted
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown sort order: {0}")]
pub struct ParseSortOrderError(String);

/// Orders offered for the favorites list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FavoritesSortOrder {
    /// Normal then foil
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "appid_asc")]
    AppIdAsc,
    #[serde(rename = "appid_desc")]
    AppIdDesc,
    #[serde(rename = "foil_first")]
    FoilFirst,
    #[serde(rename = "foil_last")]
    FoilLast,
}

impl FavoritesSortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            FavoritesSortOrder::Default => "default",
            FavoritesSortOrder::AppIdAsc => "appid_asc",
            FavoritesSortOrder::AppIdDesc => "appid_desc",
            FavoritesSortOrder::FoilFirst => "foil_first",
            FavoritesSortOrder::FoilLast => "foil_last",
        }
    }

    pub fn apply<T: BadgeOrdering>(self, items: &mut [T]) {
        match self {
            FavoritesSortOrder::Default | FavoritesSortOrder::FoilLast => sort_canonical(items),
            FavoritesSortOrder::FoilFirst => {
                sort_canonical(items);
                items.reverse();
            }
            FavoritesSortOrder::AppIdAsc => items.sort_by_key(|item| item.app_id()),
            FavoritesSortOrder::AppIdDesc => items.sort_by(|a, b| b.app_id().cmp(&a.app_id())),
        }
    }
}

impl FromStr for FavoritesSortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(FavoritesSortOrder::Default),
            "appid_asc" => Ok(FavoritesSortOrder::AppIdAsc),
            "appid_desc" => Ok(FavoritesSortOrder::AppIdDesc),
            "foil_first" => Ok(FavoritesSortOrder::FoilFirst),
            "foil_last" => Ok(FavoritesSortOrder::FoilLast),
            other => Err(ParseSortOrderError(other.to_string())),
        }
    }
}
