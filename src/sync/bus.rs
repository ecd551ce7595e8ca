//! In-process "records updated" notification channel.
//!
//! Writers (the store's append path, admin tooling) publish a payload-less
//! notification; the sync controller subscribes and refreshes. The bus is
//! an explicit value owned by the composing application and injected where
//! needed, not ambient global state.

use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 16;

/// Cloneable handle to the records-updated channel.
#[derive(Debug, Clone)]
pub struct UpdateBus {
    tx: broadcast::Sender<()>,
}

impl UpdateBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Announce that records changed elsewhere.
    ///
    /// A send with no live subscribers is not an error; the notification
    /// is simply dropped.
    pub fn notify_records_updated(&self) {
        let _ = self.tx.send(());
    }

    /// Subscribe to future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notification_reaches_subscriber() {
        let bus = UpdateBus::new();
        let mut rx = bus.subscribe();

        bus.notify_records_updated();
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let bus = UpdateBus::new();
        bus.notify_records_updated();
    }
}
