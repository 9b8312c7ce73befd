use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Invoice;

/// Events emitted after successful writes, consumed by SSE listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InvoicifyEvent {
    Welcome,
    Invoice(InvoiceEvent),
    /// Sent to a listener that fell behind and missed events; it should
    /// refetch instead of trusting its local state.
    Reconnect,
}

impl InvoicifyEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            InvoicifyEvent::Welcome => "welcome",
            InvoicifyEvent::Invoice(_) => "invoice",
            InvoicifyEvent::Reconnect => "reconnect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEvent {
    pub kind: ChangeKind,
    pub invoice_id: String,
    pub owner: String,
    pub transaction_id: String,
    /// Document after the write; absent for deletes.
    pub document: Option<Invoice>,
    pub timestamp: DateTime<Utc>,
}

/// What a listener wants to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// A single invoice document.
    Document(String),
    /// Every invoice owned by a user (the list query).
    Owner(String),
}

impl Subscription {
    /// Control events always pass; invoice events pass when they touch the
    /// subscribed document or owner.
    pub fn matches(&self, event: &InvoicifyEvent) -> bool {
        match event {
            InvoicifyEvent::Invoice(change) => match self {
                Subscription::Document(id) => &change.invoice_id == id,
                Subscription::Owner(uid) => &change.owner == uid,
            },
            InvoicifyEvent::Welcome | InvoicifyEvent::Reconnect => true,
        }
    }
}
