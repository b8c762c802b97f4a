//! Cross-tab sync bus
//!
//! Tabs of one client share storage. When one tab changes the token the
//! others hear about it here, the way a browser delivers `storage` and
//! custom token-changed events.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

static NEXT_TAB: AtomicU64 = AtomicU64::new(1);

/// Identifies one client instance on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(u64);

impl TabId {
    /// A process-unique id
    pub fn next() -> Self {
        Self(NEXT_TAB.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// A stored value was written or removed
    StorageChanged,
    /// Login or logout finished
    TokenChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSignal {
    pub origin: TabId,
    pub kind: SyncKind,
}

/// Broadcast channel shared by all tabs
#[derive(Debug, Clone)]
pub struct SyncBus {
    sender: broadcast::Sender<SyncSignal>,
}

impl SyncBus {
    /// `capacity` signals are buffered per subscriber; slower ones lag.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncSignal> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers will see the signal
    pub fn publish(&self, origin: TabId, kind: SyncKind) -> usize {
        // Err only means nobody is listening
        self.sender.send(SyncSignal { origin, kind }).unwrap_or(0)
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new(64)
    }
}
