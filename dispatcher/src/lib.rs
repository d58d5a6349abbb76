pub mod core;
pub mod errors;
pub mod scheduler;

// Re-export the main public types for convenience
pub use config::QueueConfig;
pub use core::{Dispatcher, Pending};
pub use errors::DispatchError;
pub use scheduler::DelayScheduler;
