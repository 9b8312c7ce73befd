use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::InvoiceId;
use super::revisions::Revisions;
use super::validate::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Pkr,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Pkr => "₨",
        }
    }
}

/// One line of project scope. `price` is carried but never summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
}

/// Invoice document as stored in the invoice collection.
///
/// Everything except ownership and the server-stamped timestamps is free
/// text or numbers edited by the owner. Revision state is flattened into the
/// top level so the wire format keeps `totalRevisions`, `usedRevisions` and
/// `revisionSnapshots` as plain fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub status: PaymentStatus,

    // Project
    #[serde(default)]
    pub project_title: String,
    #[serde(default)]
    pub website_pages: Option<u32>,

    // Freelancer
    #[serde(default)]
    pub freelancer_name: String,
    #[serde(default)]
    pub freelancer_email: String,
    #[serde(default)]
    pub freelancer_contact: String,

    // Client
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_contact: String,

    #[serde(default)]
    pub features: Vec<Feature>,

    #[serde(flatten)]
    pub revisions: Revisions,

    // Payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_payment: Option<f64>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub currency: Currency,
}

impl Invoice {
    /// Empty invoice owned by `owner`, stamped at `now`. The store assigns
    /// the id on insert.
    pub fn new(owner: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            created_by: owner.to_string(),
            created_at: now,
            updated_at: now,
            start_date: now,
            status: PaymentStatus::Pending,
            project_title: String::new(),
            website_pages: Some(1),
            freelancer_name: String::new(),
            freelancer_email: String::new(),
            freelancer_contact: String::new(),
            client_name: String::new(),
            client_email: String::new(),
            client_contact: String::new(),
            features: Vec::new(),
            revisions: Revisions::default(),
            total_payment: Some(0.0),
            advance_payment: Some(0.0),
            paid_payment: Some(0.0),
            payment_status: PaymentStatus::Pending,
            currency: Currency::Usd,
        }
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.created_by == uid
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        InvoiceId::parse(&self.id).ok()
    }

    /// Title for listings and filenames.
    pub fn display_title(&self) -> &str {
        let title = self.project_title.trim();
        if title.is_empty() {
            "Untitled Project"
        } else {
            title
        }
    }

    pub fn normalize(&mut self) {
        self.revisions.normalize();
    }

    /// Top-level field map of this document.
    pub fn to_fields(&self) -> Result<Map<String, Value>, ValidationError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    /// Shallow merge: every top-level field in `patch` replaces the stored
    /// one wholesale. The result is normalized.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Invoice, ValidationError> {
        let mut fields = self.to_fields()?;
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
        let mut merged: Invoice = serde_json::from_value(Value::Object(fields))?;
        merged.normalize();
        Ok(merged)
    }
}

/// Invoice as presented to a particular viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub can_edit: bool,
    pub remaining_revisions: u32,
}

impl InvoiceView {
    pub fn for_viewer(invoice: Invoice, viewer: Option<&str>) -> Self {
        let can_edit = viewer.is_some_and(|uid| invoice.is_owned_by(uid));
        let remaining_revisions = invoice.revisions.remaining();
        Self {
            invoice,
            can_edit,
            remaining_revisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Invoice {
        let mut invoice = Invoice::new("user-1", Utc::now());
        invoice.id = "inv1".into();
        invoice
    }

    #[test]
    fn new_invoice_defaults() {
        let invoice = sample();
        assert_eq!(invoice.revisions.total(), 3);
        assert_eq!(invoice.revisions.used(), 0);
        assert_eq!(invoice.website_pages, Some(1));
        assert_eq!(invoice.currency, Currency::Usd);
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
        assert!(invoice.features.is_empty());
    }

    #[test]
    fn wire_format_is_flat_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["createdBy"], "user-1");
        assert_eq!(value["totalRevisions"], 3);
        assert_eq!(value["usedRevisions"], 0);
        assert_eq!(value["revisionSnapshots"], json!([]));
        assert_eq!(value["paymentStatus"], "pending");
        assert_eq!(value["currency"], "USD");
    }

    #[test]
    fn merge_replaces_top_level_fields_only() {
        let mut base = sample();
        base.client_name = "Acme".into();
        base.features.push(Feature {
            id: "f1".into(),
            description: "Landing page".into(),
            price: 0.0,
        });

        let patch = json!({
            "projectTitle": "Portfolio",
            "features": [],
            "currency": "PKR",
        });
        let merged = base.merged(patch.as_object().unwrap()).unwrap();

        assert_eq!(merged.project_title, "Portfolio");
        assert_eq!(merged.client_name, "Acme");
        assert!(merged.features.is_empty());
        assert_eq!(merged.currency, Currency::Pkr);
    }

    #[test]
    fn merge_normalizes_revision_invariants() {
        let patch = json!({ "totalRevisions": 2, "usedRevisions": 7 });
        let merged = sample().merged(patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.revisions.total(), 2);
        assert_eq!(merged.revisions.used(), 2);
    }

    #[test]
    fn merge_clears_optional_payments_with_null() {
        let patch = json!({ "totalPayment": null, "paidPayment": 250.5 });
        let merged = sample().merged(patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.total_payment, None);
        assert_eq!(merged.paid_payment, Some(250.5));
    }

    #[test]
    fn merge_rejects_wrong_types() {
        let patch = json!({ "paymentStatus": "overdue" });
        assert!(matches!(
            sample().merged(patch.as_object().unwrap()),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn view_grants_edit_to_owner_only() {
        assert!(InvoiceView::for_viewer(sample(), Some("user-1")).can_edit);
        assert!(!InvoiceView::for_viewer(sample(), Some("user-2")).can_edit);
        assert!(!InvoiceView::for_viewer(sample(), None).can_edit);
    }
}
