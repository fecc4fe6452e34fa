//! Channel provider for live upstream decoders

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::provider::Provider;
use crate::types::FieldEvent;

/// Default capacity of the event channel created by [`ChannelProvider::channel`]
pub const DEFAULT_CAPACITY: usize = 1024;

/// Provider fed by a live decoder through a tokio channel
///
/// Any number of producers may hold a sender; the driver task that owns the
/// pipeline receives the events one at a time, in channel order.
pub struct ChannelProvider {
    receiver: mpsc::Receiver<FieldEvent>,
    received: u64,
}

impl ChannelProvider {
    /// Wrap an existing receiver
    pub fn new(receiver: mpsc::Receiver<FieldEvent>) -> Self {
        Self { receiver, received: 0 }
    }

    /// Create a sender/provider pair with the given capacity
    pub fn channel(capacity: usize) -> (mpsc::Sender<FieldEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }

    /// Events received so far
    pub fn received(&self) -> u64 {
        self.received
    }
}

#[async_trait::async_trait]
impl Provider for ChannelProvider {
    async fn next_event(&mut self) -> Result<Option<FieldEvent>> {
        match self.receiver.recv().await {
            Some(event) => {
                self.received += 1;
                Ok(Some(event))
            }
            None => {
                debug!("All event senders dropped after {} events", self.received);
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        "live channel".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TraceTime;

    #[tokio::test]
    async fn ends_when_senders_drop() {
        let (tx, mut provider) = ChannelProvider::channel(DEFAULT_CAPACITY);
        let event = FieldEvent::identifier(0x42, TraceTime::ZERO, TraceTime::from_millis(0.02));

        tx.send(event.clone()).await.expect("receiver alive");
        drop(tx);

        assert_eq!(provider.next_event().await.expect("no error"), Some(event));
        assert_eq!(provider.next_event().await.expect("no error"), None);
        assert_eq!(provider.received(), 1);
    }
}
