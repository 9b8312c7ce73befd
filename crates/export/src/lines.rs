use invoicify_core::document::{Currency, Invoice};

use crate::format::{format_date, format_raw};

/// One entry of the simple document layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Heading(String),
    Text(String),
    /// Small vertical gap after the title.
    Gap,
}

/// The visible invoice fields flattened into headings and text lines, in
/// the order every paginated export prints them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLines {
    lines: Vec<Line>,
}

impl DocumentLines {
    pub fn from_invoice(invoice: &Invoice, currency: Currency) -> Self {
        let mut doc = Builder::default();
        let symbol = currency.symbol();

        doc.heading("Invoice");
        doc.lines.push(Line::Gap);

        doc.heading("Invoice Date:");
        doc.text(format_date(invoice.created_at));

        doc.heading("Status:");
        doc.text(invoice.status.as_str());

        doc.heading("Project Title:");
        doc.text(&invoice.project_title);

        doc.heading("Website Pages:");
        doc.text(
            invoice
                .website_pages
                .map(|pages| pages.to_string())
                .unwrap_or_default(),
        );

        doc.heading("Freelancer Info:");
        doc.text(format!("Name: {}", invoice.freelancer_name));
        doc.text(format!("Email: {}", invoice.freelancer_email));
        doc.text(format!("Contact: {}", invoice.freelancer_contact));

        doc.heading("Client Info:");
        doc.text(format!("Name: {}", invoice.client_name));
        doc.text(format!("Email: {}", invoice.client_email));
        doc.text(format!("Contact: {}", invoice.client_contact));

        doc.heading("Features:");
        for (idx, feature) in invoice.features.iter().enumerate() {
            doc.text(format!("{}. {}", idx + 1, feature.description));
        }

        doc.heading("Revisions:");
        doc.text(format!("Total: {}", invoice.revisions.total()));
        doc.text(format!("Used: {}", invoice.revisions.used()));

        doc.heading("Payment:");
        doc.text(format!("Total Payment: {symbol}{}", format_raw(invoice.total_payment)));
        doc.text(format!("Paid Payment: {symbol}{}", format_raw(invoice.paid_payment)));
        doc.text(format!("Payment Status: {}", invoice.payment_status.as_str()));

        DocumentLines { lines: doc.lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Default)]
struct Builder {
    lines: Vec<Line>,
}

impl Builder {
    fn heading(&mut self, text: &str) {
        self.lines.push(Line::Heading(text.to_string()));
    }

    fn text(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Text(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use invoicify_core::document::Feature;

    fn invoice() -> Invoice {
        let mut invoice = Invoice::new("u1", Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap());
        invoice.project_title = "Bakery site".into();
        invoice.client_name = "Crumbs Ltd".into();
        invoice.total_payment = Some(1500.0);
        invoice.paid_payment = None;
        invoice.features = vec![
            Feature {
                id: "a".into(),
                description: "Menu page".into(),
                price: 0.0,
            },
            Feature {
                id: "b".into(),
                description: "Order form".into(),
                price: 0.0,
            },
        ];
        invoice
    }

    fn texts(doc: &DocumentLines) -> Vec<&str> {
        doc.lines()
            .iter()
            .filter_map(|line| match line {
                Line::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn lists_fields_in_export_order() {
        let doc = DocumentLines::from_invoice(&invoice(), Currency::Usd);
        assert_eq!(doc.lines()[0], Line::Heading("Invoice".into()));
        assert_eq!(doc.lines()[1], Line::Gap);

        let texts = texts(&doc);
        assert_eq!(texts[0], "1/15/2025");
        assert!(texts.contains(&"Name: Crumbs Ltd"));
        assert!(texts.contains(&"1. Menu page"));
        assert!(texts.contains(&"2. Order form"));
        assert!(texts.contains(&"Total: 3"));
        assert!(texts.contains(&"Total Payment: $1500"));
        assert!(texts.contains(&"Paid Payment: $"));
        assert_eq!(*texts.last().unwrap(), "Payment Status: pending");
    }

    #[test]
    fn uses_requested_currency_symbol() {
        let doc = DocumentLines::from_invoice(&invoice(), Currency::Pkr);
        assert!(texts(&doc).contains(&"Total Payment: ₨1500"));
    }
}
