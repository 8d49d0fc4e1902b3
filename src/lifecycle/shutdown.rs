//! Shutdown coordination for the service.

use tokio::sync::broadcast;

/// Handle for requesting a graceful stop.
///
/// Long-running tasks subscribe before they start; one trigger reaches
/// them all. Receivers created after the trigger miss it, so subscribe
/// first, spawn second.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Hand out a receiver that fires once when shutdown is requested.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Request shutdown. A no-op when nothing is subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
