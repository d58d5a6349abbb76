//! Signal system for store change notifications
//!
//! This crate lets presentation layers subscribe to changes in the
//! BadgeHaus cache store so several views stay consistent.

pub mod event;
pub mod manager;
pub mod prelude;

pub use event::{EventType, StoreEvent};
pub use manager::{EventCallback, SignalManager};
