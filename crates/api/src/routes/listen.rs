use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};

use invoicify_core::events::{InvoicifyEvent, Subscription};
use invoicify_core::InvoiceId;

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/invoices/{id}/listen", get(listen_document))
        .route("/v1/listen", get(listen_owner))
}

/// Changes to a single invoice. Anyone holding the id may listen, like the
/// share page.
async fn listen_document(
    State(state): State<AppState>,
    _viewer: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let id = InvoiceId::parse(&id)?;
    // Subscribe before the existence check so no write slips between them.
    let rx = state.service().subscribe();
    state.service().get(&id).await?;

    tracing::debug!(invoice_id = %id, "document listener attached");
    Ok(sse(rx, Subscription::Document(id.to_string())))
}

/// Changes to every invoice the caller owns.
async fn listen_owner(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::debug!(uid = %user.uid, "owner listener attached");
    sse(state.service().subscribe(), Subscription::Owner(user.uid))
}

fn sse(
    rx: broadcast::Receiver<InvoicifyEvent>,
    subscription: Subscription,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    Sse::new(event_stream(rx, subscription).map(|event| to_sse(&event)))
        .keep_alive(KeepAlive::default())
}

/// `welcome` first, then matching changes. A listener that falls behind the
/// bus gets `reconnect` in place of the events it missed.
fn event_stream(
    rx: broadcast::Receiver<InvoicifyEvent>,
    subscription: Subscription,
) -> impl Stream<Item = InvoicifyEvent> {
    let changes = BroadcastStream::new(rx).filter_map(move |received| match received {
        Ok(event) => subscription.matches(&event).then_some(event),
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            tracing::warn!(missed, "listener lagged behind event bus");
            Some(InvoicifyEvent::Reconnect)
        }
    });
    tokio_stream::once(InvoicifyEvent::Welcome).chain(changes)
}

fn to_sse(event: &InvoicifyEvent) -> Result<Event, axum::Error> {
    Event::default().event(event.name()).json_data(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invoicify_core::events::{ChangeKind, InvoiceEvent};
    use invoicify_core::EventBus;

    fn change(id: &str) -> InvoicifyEvent {
        InvoicifyEvent::Invoice(InvoiceEvent {
            kind: ChangeKind::Updated,
            invoice_id: id.into(),
            owner: "u1".into(),
            transaction_id: "tx".into(),
            document: None,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn welcome_then_filtered_changes() {
        let bus = EventBus::new(8);
        let mut stream = Box::pin(event_stream(
            bus.subscribe(),
            Subscription::Document("a".into()),
        ));
        bus.publish(change("b"));
        bus.publish(change("a"));

        assert!(matches!(stream.next().await, Some(InvoicifyEvent::Welcome)));
        match stream.next().await {
            Some(InvoicifyEvent::Invoice(event)) => assert_eq!(event.invoice_id, "a"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn lagging_listener_is_told_to_reconnect() {
        let bus = EventBus::new(2);
        let mut stream = Box::pin(event_stream(bus.subscribe(), Subscription::Owner("u1".into())));
        for _ in 0..5 {
            bus.publish(change("a"));
        }

        assert!(matches!(stream.next().await, Some(InvoicifyEvent::Welcome)));
        assert!(matches!(stream.next().await, Some(InvoicifyEvent::Reconnect)));
    }
}
