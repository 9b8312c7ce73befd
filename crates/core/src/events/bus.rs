use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::types::{ChangeKind, InvoiceEvent, InvoicifyEvent};
use crate::document::Invoice;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<InvoicifyEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Returns how many
    /// listeners received it; having none is not an error.
    pub fn publish(&self, event: InvoicifyEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Announce a committed write to `id`. Each change gets a fresh
    /// time-ordered transaction id so listeners can discard duplicates.
    pub fn publish_change(
        &self,
        kind: ChangeKind,
        id: &str,
        owner: &str,
        document: Option<&Invoice>,
    ) -> usize {
        self.publish(InvoicifyEvent::Invoice(InvoiceEvent {
            kind,
            invoice_id: id.to_string(),
            owner: owner.to_string(),
            transaction_id: Uuid::now_v7().to_string(),
            document: document.cloned(),
            timestamp: Utc::now(),
        }))
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<InvoicifyEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    fn change(kind: ChangeKind, invoice_id: &str) -> InvoicifyEvent {
        InvoicifyEvent::Invoice(InvoiceEvent {
            kind,
            invoice_id: invoice_id.into(),
            owner: "alice".into(),
            transaction_id: format!("tx-{invoice_id}"),
            document: None,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn change_reaches_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(change(ChangeKind::Created, "inv-1")), 1);

        match rx.recv().await.unwrap() {
            InvoicifyEvent::Invoice(event) => {
                assert_eq!(event.kind, ChangeKind::Created);
                assert_eq!(event.invoice_id, "inv-1");
                assert_eq!(event.owner, "alice");
                assert_eq!(event.transaction_id, "tx-inv-1");
            }
            other => panic!("expected an invoice change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_listener_sees_changes_in_order() {
        let bus = EventBus::new(16);
        let mut editor = bus.subscribe();
        let mut viewer = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(change(ChangeKind::Created, "inv-1"));
        bus.publish(change(ChangeKind::Updated, "inv-1"));

        for rx in [&mut editor, &mut viewer] {
            for expected in [ChangeKind::Created, ChangeKind::Updated] {
                match rx.recv().await.unwrap() {
                    InvoicifyEvent::Invoice(event) => assert_eq!(event.kind, expected),
                    other => panic!("expected an invoice change, got {other:?}"),
                }
            }
        }
    }

    #[tokio::test]
    async fn slow_listener_is_told_it_lagged() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for id in ["inv-1", "inv-2", "inv-3"] {
            bus.publish(change(ChangeKind::Updated, id));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        match rx.recv().await.unwrap() {
            InvoicifyEvent::Invoice(event) => assert_eq!(event.invoice_id, "inv-2"),
            other => panic!("expected an invoice change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn published_change_carries_document_and_fresh_transaction() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let invoice = Invoice::new("alice", Utc::now());

        bus.publish_change(ChangeKind::Updated, "inv-1", "alice", Some(&invoice));
        bus.publish_change(ChangeKind::Deleted, "inv-1", "alice", None);

        let (first, second) = match (rx.recv().await.unwrap(), rx.recv().await.unwrap()) {
            (InvoicifyEvent::Invoice(first), InvoicifyEvent::Invoice(second)) => (first, second),
            other => panic!("expected two invoice changes, got {other:?}"),
        };
        assert_eq!(first.document.map(|doc| doc.created_by), Some("alice".to_string()));
        assert!(second.document.is_none());
        assert_eq!(second.kind, ChangeKind::Deleted);
        assert_ne!(first.transaction_id, second.transaction_id);
    }

    #[test]
    fn change_without_listeners_is_dropped() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(change(ChangeKind::Deleted, "inv-1")), 0);
    }
}
