//! Invoice document store.
//!
//! The store is a schemaless per-record collection keyed by opaque id. It
//! knows nothing about ownership or revision rules: callers hand it whole
//! documents and it keeps the last one written.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::Invoice;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new document, assigning its id. Any id already on
    /// `invoice` is replaced.
    async fn insert(&self, invoice: Invoice) -> StoreResult<Invoice>;

    /// Point read.
    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>>;

    /// Overwrite an existing document. Returns `None` when it no longer
    /// exists.
    async fn replace(&self, invoice: Invoice) -> StoreResult<Option<Invoice>>;

    /// Delete a document. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Documents created by `owner`, most recently updated first.
    async fn list_by_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Invoice>>;

    /// Cheap liveness check for health endpoints.
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
