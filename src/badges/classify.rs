//! Foil classification
//!
//! The remote listing does not reliably flag foil badges, so the flag is
//! derived from several signals. This is a best-effort classification: an
//! explicit source flag always wins over name patterns.

use regex::Regex;
use std::sync::LazyLock;

use super::record::BadgeRecord;

/// Families with more base levels than this are event-style badge sets
pub const HIGH_LEVEL_FAMILY_THRESHOLD: u32 = 7;

static FAMILY_FOIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*? - Foil \d+").expect("valid regex"));

/// Why a badge was classified the way it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoilEvidence {
    ExplicitFlag,
    /// Event-style family whose name carries `- Foil <digits>`
    HighLevelFamilyPattern,
    /// Name contains ` - Foil ` or starts with `Foil `
    NamePattern,
    None,
}

impl FoilEvidence {
    pub fn is_foil(self) -> bool {
        !matches!(self, FoilEvidence::None)
    }
}

/// True when any badge of the family sits above the threshold level
pub fn is_high_level_family<I>(base_levels: I) -> bool
where
    I: IntoIterator<Item = u32>,
{
    base_levels
        .into_iter()
        .any(|level| level > HIGH_LEVEL_FAMILY_THRESHOLD)
}

pub fn foil_evidence(explicit_flag: bool, name: &str, high_level_family: bool) -> FoilEvidence {
    if explicit_flag {
        return FoilEvidence::ExplicitFlag;
    }
    if high_level_family && FAMILY_FOIL_RE.is_match(name) {
        return FoilEvidence::HighLevelFamilyPattern;
    }

    let lowered = name.to_lowercase();
    if lowered.contains(" - foil ") || lowered.starts_with("foil ") {
        return FoilEvidence::NamePattern;
    }
    FoilEvidence::None
}

/// Classify every badge of one family in place
///
/// The current `is_foil` value of each record is taken as the explicit
/// source flag.
pub fn classify_foils(badges: &mut [BadgeRecord]) {
    let high_level_family = is_high_level_family(badges.iter().map(|b| b.base_level));
    for badge in badges.iter_mut() {
        badge.is_foil = foil_evidence(badge.is_foil, &badge.name, high_level_family).is_foil();
    }
}
