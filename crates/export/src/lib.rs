//! Invoice document exports: paginated text, a minimal PDF, and the
//! read-only HTML layout shared with the public view.

pub mod format;
pub mod html;
pub mod lines;
pub mod pdf;
pub mod text;

use serde::Deserialize;

use invoicify_core::document::{Currency, Invoice};

pub use html::{render_html, render_not_found, ShareView};
pub use lines::{DocumentLines, Line};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    #[default]
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// A rendered, downloadable file.
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Render `invoice` in `format`, printing amounts in `currency`.
pub fn export(
    invoice: &Invoice,
    format: ExportFormat,
    currency: Currency,
) -> Result<Export, ExportError> {
    let body = match format {
        ExportFormat::Text => {
            let doc = DocumentLines::from_invoice(invoice, currency);
            text::render_text(&doc).into_bytes()
        }
        ExportFormat::Pdf => pdf::render_pdf(&DocumentLines::from_invoice(invoice, currency)),
        ExportFormat::Html => {
            render_html(&ShareView::from_invoice(invoice, currency))?.into_bytes()
        }
    };
    tracing::debug!(invoice_id = %invoice.id, ?format, bytes = body.len(), "rendered export");

    Ok(Export {
        filename: format::filename(&invoice.project_title, format.extension()),
        content_type: format.content_type(),
        body,
    })
}
