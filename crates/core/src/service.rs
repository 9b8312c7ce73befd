//! Invoice service: ownership checks, the save path and change events on top
//! of an [`InvoiceStore`].
//!
//! Writes are last-write-wins. There is no version token; a save merges the
//! caller's fields over whatever the store holds at that moment.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::User;
use crate::document::{sanitize_patch, Invoice, InvoiceId, InvoiceView, ValidationError};
use crate::events::{ChangeKind, EventBus, InvoicifyEvent};
use crate::mutation::{EditSession, Mutation, MutationResponse, SessionError};
use crate::store::{InvoiceStore, StoreError};

/// Most invoices returned by the owner list query.
pub const LIST_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invoice not found: {0}")]
    NotFound(String),
    #[error("only the invoice owner can {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ReadOnly => ServiceError::Forbidden("edit it"),
            SessionError::Validation(err) => ServiceError::Validation(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    bus: EventBus,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &dyn InvoiceStore {
        self.store.as_ref()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvoicifyEvent> {
        self.bus.subscribe()
    }

    /// Create an empty invoice owned by `owner`.
    #[tracing::instrument(skip_all, fields(owner = %owner.uid))]
    pub async fn create(&self, owner: &User) -> ServiceResult<Invoice> {
        let invoice = self
            .store
            .insert(Invoice::new(&owner.uid, Utc::now()))
            .await
            .inspect_err(|e| tracing::error!("Error creating invoice: {e}"))?;

        tracing::info!(invoice_id = %invoice.id, "invoice created");
        self.emit(ChangeKind::Created, &invoice.id, &invoice.created_by, Some(&invoice));
        Ok(invoice)
    }

    #[tracing::instrument(skip(self), fields(invoice_id = %id))]
    pub async fn get(&self, id: &InvoiceId) -> ServiceResult<Invoice> {
        self.store
            .get(id.as_str())
            .await
            .inspect_err(|e| tracing::error!("Error fetching invoice: {e}"))?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Fetch with the viewer's edit rights resolved. Viewing needs no
    /// ownership, only the id.
    pub async fn view(&self, id: &InvoiceId, viewer: Option<&User>) -> ServiceResult<InvoiceView> {
        let invoice = self.get(id).await?;
        Ok(InvoiceView::for_viewer(
            invoice,
            viewer.map(|user| user.uid.as_str()),
        ))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner.uid))]
    pub async fn list_for(&self, owner: &User) -> ServiceResult<Vec<Invoice>> {
        let invoices = self
            .store
            .list_by_owner(&owner.uid, LIST_LIMIT)
            .await
            .inspect_err(|e| tracing::error!("Error listing invoices: {e}"))?;
        Ok(invoices)
    }

    /// Load an invoice and check `user` owns it.
    pub async fn require_owner(
        &self,
        user: &User,
        id: &InvoiceId,
        action: &'static str,
    ) -> ServiceResult<Invoice> {
        let invoice = self.get(id).await?;
        if !invoice.is_owned_by(&user.uid) {
            tracing::warn!(invoice_id = %id, uid = %user.uid, "rejected non-owner {action}");
            return Err(ServiceError::Forbidden(action));
        }
        Ok(invoice)
    }

    /// Save a shallow patch over the stored document.
    #[tracing::instrument(skip(self, user, patch), fields(invoice_id = %id, uid = %user.uid))]
    pub async fn save(&self, user: &User, id: &InvoiceId, patch: Value) -> ServiceResult<Invoice> {
        let fields = sanitize_patch(patch)?;
        let stored = self.require_owner(user, id, "save it").await?;
        let merged = stored.merged(&fields)?;
        self.persist(merged).await
    }

    /// Apply a batch of edits as one write.
    #[tracing::instrument(skip(self, user, mutations), fields(invoice_id = %id, uid = %user.uid))]
    pub async fn apply(
        &self,
        user: &User,
        id: &InvoiceId,
        mutations: Vec<Mutation>,
    ) -> ServiceResult<MutationResponse> {
        let stored = self.require_owner(user, id, "edit it").await?;
        let mut session = EditSession::open(stored, Some(&user.uid));
        let results = session.apply_all(mutations, Utc::now())?;
        let document = if results.iter().any(|result| result.applied) {
            self.persist(session.into_invoice()).await?
        } else {
            session.into_invoice()
        };

        Ok(MutationResponse {
            transaction_id: Uuid::now_v7().to_string(),
            results,
            document,
        })
    }

    #[tracing::instrument(skip(self, user), fields(invoice_id = %id, uid = %user.uid))]
    pub async fn delete(&self, user: &User, id: &InvoiceId) -> ServiceResult<()> {
        let invoice = self.require_owner(user, id, "delete it").await?;
        let removed = self
            .store
            .delete(id.as_str())
            .await
            .inspect_err(|e| tracing::error!("Error deleting invoice: {e}"))?;
        if !removed {
            return Err(ServiceError::NotFound(id.to_string()));
        }

        tracing::info!("invoice deleted");
        self.emit(ChangeKind::Deleted, id.as_str(), &invoice.created_by, None);
        Ok(())
    }

    async fn persist(&self, mut invoice: Invoice) -> ServiceResult<Invoice> {
        invoice.normalize();
        invoice.updated_at = Utc::now();

        let saved = self
            .store
            .replace(invoice.clone())
            .await
            .inspect_err(|e| tracing::error!("Error saving invoice: {e}"))?
            .ok_or_else(|| ServiceError::NotFound(invoice.id.clone()))?;

        self.emit(ChangeKind::Updated, &saved.id, &saved.created_by, Some(&saved));
        Ok(saved)
    }

    fn emit(&self, kind: ChangeKind, id: &str, owner: &str, document: Option<&Invoice>) {
        let listeners = self.bus.publish_change(kind, id, owner, document);
        tracing::debug!(invoice_id = id, ?kind, listeners, "published change");
    }
}
