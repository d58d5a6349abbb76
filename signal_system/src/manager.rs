use std::sync::Arc;

use crate::event::{EventType, StoreEvent};

/// Subscriber callback invoked for every emitted event
pub type EventCallback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Signal manager for store change notifications
pub struct SignalManager {
    callbacks: std::sync::RwLock<Vec<EventCallback>>,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: std::sync::RwLock::new(Vec::new()),
        }
    }

    /// Add event callback
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Add a callback that only sees events for one partition
    pub fn add_partition_callback<F>(&self, partition: &str, callback: F)
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let partition = partition.to_string();
        self.add_callback(move |event| {
            if event.partition == partition {
                callback(event);
            }
        });
    }

    /// Emit event to all subscribers
    ///
    /// Callbacks run after the registry lock is released, so they may
    /// register or clear callbacks; those changes apply from the next event.
    pub fn emit(&self, event: StoreEvent) {
        tracing::trace!(
            partition = %event.partition,
            event_type = ?event.event_type,
            "emitting store event"
        );
        let callbacks: Vec<EventCallback> = match self.callbacks.read() {
            Ok(callbacks) => callbacks.clone(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(&event);
        }
    }

    /// Emit a put/delete event for one key
    pub fn emit_change(&self, event_type: EventType, partition: &str, key: &str) {
        self.emit(StoreEvent::new(event_type, partition).with_key(key));
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_all_callbacks() {
        let manager = SignalManager::new();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let seen = seen.clone();
            manager.add_callback(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        manager.emit(StoreEvent::new(EventType::Put, "favorites"));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(manager.callback_count(), 3);
    }

    #[test]
    fn test_partition_filter() {
        let manager = SignalManager::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        manager.add_partition_callback("favorites", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit_change(EventType::Put, "badge_data", "440");
        manager.emit_change(EventType::Delete, "favorites", "\"440_foil\"");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_can_subscribe_during_emit() {
        let manager = Arc::new(SignalManager::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&manager);
        let counter = seen.clone();
        manager.add_callback(move |_| {
            if let Some(manager) = weak.upgrade() {
                let counter = counter.clone();
                manager.add_callback(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        manager.emit(StoreEvent::new(EventType::Put, "favorites"));
        assert_eq!(manager.callback_count(), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        manager.emit(StoreEvent::new(EventType::Put, "favorites"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_callbacks() {
        let manager = SignalManager::default();
        manager.add_callback(|_| {});
        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
    }
}
