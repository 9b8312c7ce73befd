pub mod id;
pub mod model;
pub mod revisions;
pub mod validate;

pub use id::{IdError, InvoiceId};
pub use model::{Currency, Feature, Invoice, InvoiceView, PaymentStatus};
pub use revisions::{Outcome, RevisionSnapshot, Revisions, MAX_SNAPSHOTS};
pub use validate::{sanitize_patch, ValidationError};
