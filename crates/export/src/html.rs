//! Read-only HTML rendering, used both for the public share page and the
//! HTML layout export. Edit controls are never part of this layout.

use serde::Serialize;
use tera::{Context, Tera};

use invoicify_core::document::{Currency, Invoice, PaymentStatus};

use crate::format::{format_amount, format_date, format_date_time, format_raw, format_time};
use crate::ExportError;

const SHARE_TEMPLATE: &str = include_str!("../templates/share.html");

const NOT_FOUND_PAGE: &str = concat!(
    "<!DOCTYPE html>\n",
    "<html lang=\"en\">\n",
    "<head><meta charset=\"utf-8\"><title>Invoice not found</title></head>\n",
    "<body><p>Invoice not found.</p></body>\n",
    "</html>\n",
);

#[derive(Debug, Clone, Serialize)]
pub struct Party {
    pub heading: &'static str,
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRow {
    pub taken_at: String,
    pub used: u32,
}

/// Pre-formatted template context for one invoice.
#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    pub title: String,
    pub start_date: String,
    pub last_updated: String,
    pub project_title: String,
    pub website_pages: String,
    pub parties: Vec<Party>,
    pub has_features: bool,
    pub features: Vec<String>,
    pub total_revisions: u32,
    pub used_revisions: u32,
    pub remaining_revisions: u32,
    pub has_snapshots: bool,
    pub snapshots: Vec<SnapshotRow>,
    pub currency_symbol: &'static str,
    pub total_payment: String,
    pub full_payment: Option<String>,
    pub paid_payment: Option<String>,
    pub advance_shown: Option<String>,
    pub payment_status: &'static str,
    pub payment_status_label: &'static str,
}

impl ShareView {
    pub fn from_invoice(invoice: &Invoice, currency: Currency) -> Self {
        let paid = invoice.payment_status == PaymentStatus::Paid;
        let total = invoice.total_payment.unwrap_or(0.0);
        let advance = invoice.advance_payment.unwrap_or(0.0);
        let revisions = &invoice.revisions;

        let features: Vec<String> = invoice
            .features
            .iter()
            .map(|feature| feature.description.clone())
            .collect();
        let snapshots: Vec<SnapshotRow> = revisions
            .snapshots()
            .iter()
            .map(|snapshot| SnapshotRow {
                taken_at: format_date_time(snapshot.timestamp),
                used: snapshot.used_revisions,
            })
            .collect();

        ShareView {
            title: format!("Invoice: {}", invoice.display_title()),
            start_date: format_date(invoice.start_date),
            last_updated: format_time(invoice.updated_at),
            project_title: invoice.project_title.clone(),
            website_pages: invoice
                .website_pages
                .map(|pages| pages.to_string())
                .unwrap_or_default(),
            parties: vec![
                Party {
                    heading: "Freelancer Info",
                    name: invoice.freelancer_name.clone(),
                    email: invoice.freelancer_email.clone(),
                    contact: invoice.freelancer_contact.clone(),
                },
                Party {
                    heading: "Client Info",
                    name: invoice.client_name.clone(),
                    email: invoice.client_email.clone(),
                    contact: invoice.client_contact.clone(),
                },
            ],
            has_features: !features.is_empty(),
            features,
            total_revisions: revisions.total(),
            used_revisions: revisions.used(),
            remaining_revisions: revisions.remaining(),
            has_snapshots: !snapshots.is_empty(),
            snapshots,
            currency_symbol: currency.symbol(),
            total_payment: format_raw(invoice.total_payment),
            full_payment: (paid && total > 0.0).then(|| format_amount(total)),
            paid_payment: invoice.paid_payment.map(|v| format_raw(Some(v))),
            advance_shown: (paid && advance > 0.0).then(|| format_amount(advance)),
            payment_status: invoice.payment_status.as_str(),
            payment_status_label: invoice.payment_status.label(),
        }
    }
}

pub fn render_html(view: &ShareView) -> Result<String, ExportError> {
    let context = Context::from_serialize(view)?;
    Ok(Tera::one_off(SHARE_TEMPLATE, &context, true)?)
}

/// Static page for unknown invoice ids.
pub fn render_not_found() -> &'static str {
    NOT_FOUND_PAGE
}
