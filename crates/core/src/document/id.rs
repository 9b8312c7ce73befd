/// Invoice ID utilities.
///
/// Invoice IDs are opaque, store-assigned strings. They are embedded in share
/// URLs (`/invoice/{id}/text`), so anything accepted from a path must be
/// url-safe:
/// - 1 to 128 characters
/// - ASCII letters, digits, `-` and `_` only
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const MAX_ID_LEN: usize = 128;
const SHARE_SUFFIX: &str = "/text";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("invoice id cannot be empty")]
    Empty,
    #[error("invoice id is longer than {MAX_ID_LEN} characters")]
    TooLong,
    #[error("invoice id contains invalid character '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Generate a fresh store-assigned ID.
    pub fn generate() -> Self {
        InvoiceId(new_id())
    }

    /// Parse an untrusted ID, typically a path segment.
    pub fn parse(id: &str) -> Result<Self, IdError> {
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if id.len() > MAX_ID_LEN {
            return Err(IdError::TooLong);
        }
        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(IdError::InvalidChar(bad));
        }
        Ok(InvoiceId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the public read-only view for this invoice.
    pub fn share_path(&self) -> String {
        format!("/invoice/{}{SHARE_SUFFIX}", self.0)
    }

    /// Absolute share URL rooted at `base_url`.
    pub fn share_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.share_path())
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InvoiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// New opaque identifier for invoices, features and snapshots.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
