//! "Threads changed" broadcast.
//!
//! After a successful exchange the thread list is stale: a brand-new
//! thread only receives its server-assigned title then. Rather than couple
//! the exchange path to the sidebar, completion is announced on a
//! payload-less in-process channel; subscribers re-fetch authoritative
//! state instead of trusting a pushed delta. Best-effort delivery, no
//! replay for late subscribers.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Process-wide publish/subscribe signal for thread list invalidation.
#[derive(Clone)]
pub struct ThreadsChangedBus {
    tx: broadcast::Sender<()>,
}

impl Default for ThreadsChangedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadsChangedBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Announce that server-side thread state changed. A send with no
    /// subscribers is fine; nobody is looking at a thread list yet.
    pub fn notify(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}
