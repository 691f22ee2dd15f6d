//! Broadcasting of storage change events.
//!
//! Each backend owns one `ChangeBus`. Every facade built on that backend
//! subscribes to it, so a write made through one facade (one tab) reaches the
//! change listeners of all the others.
//!
//! # Example
//!
//! ```rust
//! use chat_groups_core::event_bus::ChangeBus;
//! use chat_groups_core::storage::{AreaChange, StorageArea, StorageChanges};
//!
//! let bus = ChangeBus::new();
//! let rx = bus.subscribe();
//!
//! bus.emit(AreaChange::new(StorageArea::Local, StorageChanges::new()));
//!
//! // In async context:
//! // let change = rx.recv().await.unwrap();
//! # drop(rx);
//! ```

use tokio::sync::broadcast;

use crate::storage::AreaChange;

/// Default channel capacity for the change bus.
/// Listeners that fall further behind than this miss changes (lag).
const DEFAULT_CAPACITY: usize = 256;

pub struct ChangeBus {
    sender: broadcast::Sender<AreaChange>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a change to all listeners.
    ///
    /// Returns the number of receivers that got it; with no receivers the change
    /// is dropped and 0 is returned.
    pub fn emit(&self, change: AreaChange) -> usize {
        if change.changes.is_empty() {
            return 0;
        }
        self.sender.send(change).unwrap_or(0)
    }

    /// Receive all future changes. Past changes are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<AreaChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
