//! Badge data: records, response decoding, classification and the service
//! that answers "badges for app X" from cache or network.

pub mod classify;
pub mod envelope;
pub mod record;
pub mod service;

pub use classify::{FoilEvidence, classify_foils, foil_evidence, is_high_level_family};
pub use envelope::{BadgeEnvelope, BadgeListing, RawBadge};
pub use record::{BadgeCacheRecord, BadgeRecord, UNKNOWN_BADGE, UNKNOWN_GAME};
pub use service::{BADGE_PARTITION, BadgeService};
