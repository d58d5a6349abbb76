//! Convenience re-exports for common signal-system usage

// Core signal system components
pub use crate::event::{EventType, StoreEvent};
pub use crate::manager::{EventCallback, SignalManager};
