//! Background task bridging the event bus to the routers.
//!
//! Subscribes to the bus and drives every received notice message through
//! both routers sequentially. Router failures never terminate the loop; the
//! task ends only when the bus sender is dropped.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::EventBus;
use crate::routers::Routers;

/// Spawn the forwarder loop on the current runtime.
pub fn spawn(bus: Arc<EventBus>, routers: Arc<Routers>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        tracing::info!("Notification forwarder started");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        msg_type = ?event.msg_type,
                        username = ?event.username,
                        "Forwarding notice message"
                    );
                    routers.bark.handle(&event).await;
                    routers.wxpusher.handle(&event).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Forwarder lagged behind the event bus");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Event bus closed, stopping forwarder");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::events::NoticeMessage;
    use crate::routers::transport::testing::RecordingTransport;

    fn test_routers(transport: Arc<RecordingTransport>) -> Arc<Routers> {
        let mut settings = Settings::default();
        settings.bark.enabled = true;
        settings.bark.apikey = "alice:KEYA".to_string();
        Arc::new(Routers::new(&settings, transport))
    }

    #[tokio::test]
    async fn forwarder_drives_published_events_through_routers() {
        let transport = Arc::new(RecordingTransport::replying(
            200,
            r#"{"code":200,"message":"success"}"#,
        ));
        let bus = Arc::new(EventBus::default());
        let handle = spawn(bus.clone(), test_routers(transport.clone()));

        bus.publish(NoticeMessage::new("T", "B").with_username("alice"));

        // Give the task a chance to drain the channel.
        tokio::task::yield_now().await;
        for _ in 0..50 {
            if !transport.requests().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(transport.requests().len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn forwarder_stops_when_bus_is_dropped() {
        let transport = Arc::new(RecordingTransport::replying(200, "{}"));
        let bus = Arc::new(EventBus::default());
        let handle = spawn(bus.clone(), test_routers(transport));

        drop(bus);

        handle.await.expect("forwarder should exit cleanly");
    }
}
