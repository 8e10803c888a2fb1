//! Broadcast-based business event notifier
//!
//! Modeled on a tokio broadcast channel: publishing never blocks, and a
//! notifier with no subscribers simply drops events on the floor.

use async_trait::async_trait;
use lendcore_domain::events::BusinessEvent;
use lendcore_domain::ports::BusinessEventNotifierService;
use lendcore_domain::Result;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Business-event notifier backed by a tokio broadcast channel
pub struct TokioBroadcastEventNotifier {
    sender: broadcast::Sender<BusinessEvent>,
}

impl TokioBroadcastEventNotifier {
    /// Create a notifier with the default channel capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a notifier with an explicit channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<BusinessEvent> {
        self.sender.subscribe()
    }
}

impl Default for TokioBroadcastEventNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusinessEventNotifierService for TokioBroadcastEventNotifier {
    async fn notify(&self, event: BusinessEvent) -> Result<()> {
        debug!(loan_id = %event.loan_id(), ?event, "publishing business event");
        // A send error only means nobody is subscribed.
        let _ = self.sender.send(event);
        Ok(())
    }
}
