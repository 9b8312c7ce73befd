//! Invoice domain: documents, revision tracking, edit sessions, storage and
//! change events.

pub mod auth;
pub mod autosave;
pub mod document;
pub mod events;
pub mod mutation;
pub mod service;
pub mod store;

pub use auth::{TokenKeys, User};
pub use autosave::Autosaver;
pub use document::{Invoice, InvoiceId, InvoiceView};
pub use events::EventBus;
pub use service::{InvoiceService, ServiceError};
pub use store::{InvoiceStore, MemoryStore, PgStore};
