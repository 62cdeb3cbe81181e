//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`NoticeMessage`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application. Delivery
//! is at-most-once per publish; when the buffer fills, the oldest un-consumed
//! messages are dropped and slow receivers observe a `RecvError::Lagged`.

use tokio::sync::broadcast;

use crate::events::types::NoticeMessage;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus for notice messages.
pub struct EventBus {
    sender: broadcast::Sender<NoticeMessage>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: NoticeMessage) {
        // A SendError only means there are zero receivers right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NoticeMessage> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(NoticeMessage::new("Title", "Body").with_username("alice"));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.title.as_deref(), Some("Title"));
        assert_eq!(received.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(NoticeMessage::new("T", "B"));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(NoticeMessage::new("orphan", "event"));
    }
}
