//! Domain event dispatcher
//!
//! Typed events produced by the order engine after its transaction commits,
//! delivered to listeners over a tokio broadcast channel. Listener execution
//! is asynchronous relative to the HTTP response: the engine publishes and
//! returns without waiting, and a failing or missing listener never affects
//! the committed write.

use serde::Serialize;
use tokio::sync::broadcast;

/// Credits were granted for a processed order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreditAddedEvent {
    pub entrant_id: String,
    pub credit_id: String,
    pub competition_id: String,
    pub quantity: i64,
    pub entrant_email: String,
    pub entrant_name: Option<String>,
}

/// An order was routed to the human-review queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPendingReviewEvent {
    pub pending_order_id: String,
    pub external_order_id: String,
    pub external_source: String,
    pub competition_id: String,
    pub entrant_email: String,
    pub quantity: i64,
    /// Enumerated code, e.g. `COMPETITION_EXCLUSIVITY`
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum DomainEvent {
    EntryCreditAdded(EntryCreditAddedEvent),
    OrderPendingReview(OrderPendingReviewEvent),
}

/// Fan-out point for domain events
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one event, fire-and-forget. A send error only means no
    /// listener is currently subscribed.
    pub fn publish(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Domain event published with no listeners");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit_event() -> DomainEvent {
        DomainEvent::EntryCreditAdded(EntryCreditAddedEvent {
            entrant_id: "e1".into(),
            credit_id: "c1".into(),
            competition_id: "comp1".into(),
            quantity: 3,
            entrant_email: "a@x.com".into(),
            entrant_name: None,
        })
    }

    #[test]
    fn publish_without_listeners_is_a_noop() {
        let dispatcher = EventDispatcher::new(8);
        dispatcher.publish(credit_event());
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let dispatcher = EventDispatcher::new(8);
        let mut rx = dispatcher.subscribe();
        dispatcher.publish(credit_event());

        match rx.recv().await.unwrap() {
            DomainEvent::EntryCreditAdded(ev) => {
                assert_eq!(ev.credit_id, "c1");
                assert_eq!(ev.quantity, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
