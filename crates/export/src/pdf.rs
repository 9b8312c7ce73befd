//! Minimal PDF writer for the simple invoice document.
//!
//! Produces PDF 1.4 with the two standard Helvetica faces, so no fonts are
//! embedded. Layout is top-down in millimetres on A4: 15 mm margins, 10 mm
//! per line, and a new page whenever the next line would cross the bottom
//! margin.

use std::fmt::Write as _;

use crate::lines::{DocumentLines, Line};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 15.0;
const LINE_HEIGHT_MM: f64 = 10.0;
const GAP_MM: f64 = 2.0;
const FONT_SIZE: f64 = 12.0;
const PT_PER_MM: f64 = 72.0 / 25.4;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// A positioned run of text on a page.
#[derive(Debug, Clone, PartialEq)]
struct Placed<'a> {
    font: &'static str,
    y_mm: f64,
    text: &'a str,
}

/// Split the document into the slices that share a page. A line moves to a
/// new page when it would start below the bottom margin; gaps only advance
/// the cursor.
pub fn pages(doc: &DocumentLines) -> Vec<&[Line]> {
    let lines = doc.lines();
    let mut pages = Vec::new();
    let mut start = 0;
    let mut y = MARGIN_MM;

    for (idx, line) in lines.iter().enumerate() {
        if *line == Line::Gap {
            y += GAP_MM;
            continue;
        }
        if y > PAGE_HEIGHT_MM - MARGIN_MM {
            pages.push(&lines[start..idx]);
            start = idx;
            y = MARGIN_MM;
        }
        y += LINE_HEIGHT_MM;
    }
    pages.push(&lines[start..]);
    pages
}

/// Lay the document out into pages.
fn layout(doc: &DocumentLines) -> Vec<Vec<Placed<'_>>> {
    pages(doc)
        .into_iter()
        .map(|page| {
            let mut y = MARGIN_MM;
            let mut placed = Vec::with_capacity(page.len());
            for line in page {
                let (font, text) = match line {
                    Line::Heading(text) => (BOLD, text.as_str()),
                    Line::Text(text) => (REGULAR, text.as_str()),
                    Line::Gap => {
                        y += GAP_MM;
                        continue;
                    }
                };
                placed.push(Placed { font, y_mm: y, text });
                y += LINE_HEIGHT_MM;
            }
            placed
        })
        .collect()
}

/// Number of pages [`render_pdf`] will produce.
pub fn page_count(doc: &DocumentLines) -> usize {
    layout(doc).len()
}

/// Render the document as PDF bytes.
pub fn render_pdf(doc: &DocumentLines) -> Vec<u8> {
    let pages = layout(doc);
    let mut writer = PdfWriter::default();

    // Fixed objects: 1 catalog, 2 page tree, 3 and 4 fonts. Each page then
    // takes a page object and a content stream object.
    let first_page_obj = 5;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();

    writer.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
    writer.object(
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .as_bytes(),
    );
    writer.object(3, font_dict("Helvetica").as_bytes());
    writer.object(4, font_dict("Helvetica-Bold").as_bytes());

    let width_pt = PAGE_WIDTH_MM * PT_PER_MM;
    let height_pt = PAGE_HEIGHT_MM * PT_PER_MM;
    for (i, page) in pages.iter().enumerate() {
        let page_obj = first_page_obj + 2 * i;
        let content_obj = page_obj + 1;

        writer.object(
            page_obj,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width_pt:.2} {height_pt:.2}] \
                 /Resources << /Font << /{REGULAR} 3 0 R /{BOLD} 4 0 R >> >> \
                 /Contents {content_obj} 0 R >>"
            )
            .as_bytes(),
        );

        let stream = content_stream(page, height_pt);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        writer.object(content_obj, &body);
    }

    writer.finish(1)
}

fn font_dict(base_font: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base_font} /Encoding /WinAnsiEncoding >>")
}

fn content_stream(page: &[Placed<'_>], height_pt: f64) -> Vec<u8> {
    let x = MARGIN_MM * PT_PER_MM;
    let mut out = Vec::new();
    for placed in page {
        let y = height_pt - placed.y_mm * PT_PER_MM;
        let mut op = String::new();
        // Writing to a String cannot fail.
        let _ = write!(op, "BT /{} {FONT_SIZE} Tf {x:.2} {y:.2} Td (", placed.font);
        out.extend_from_slice(op.as_bytes());
        out.extend_from_slice(&encode_text(placed.text));
        out.extend_from_slice(b") Tj ET\n");
    }
    out
}

/// Encode text as a WinAnsi literal string body. Parentheses and
/// backslashes are escaped; the rupee sign becomes `Rs`; anything else
/// outside Latin-1 becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            '\u{20a8}' => out.extend_from_slice(b"Rs"),
            '\n' | '\r' | '\t' => out.push(b' '),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xff => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Object table bookkeeping: objects must be written in id order so the
/// cross-reference offsets line up.
#[derive(Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn object(&mut self, id: usize, body: &[u8]) {
        if self.buf.is_empty() {
            self.buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        }
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invoicify_core::document::{Currency, Feature, Invoice};

    fn doc(features: usize, currency: Currency) -> DocumentLines {
        let mut invoice = Invoice::new("u1", Utc::now());
        invoice.project_title = "Site (v2)".into();
        invoice.features = (0..features)
            .map(|i| Feature {
                id: i.to_string(),
                description: format!("Feature {i}"),
                price: 0.0,
            })
            .collect();
        DocumentLines::from_invoice(&invoice, currency)
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn produces_well_formed_single_page() {
        let pdf = render_pdf(&doc(2, Currency::Usd));
        let text = as_text(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("(Site \\(v2\\)) Tj"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_pdf(&doc(3, Currency::Usd));
        let text = as_text(&pdf);
        let xref_start = text.rfind("xref\n").unwrap();
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| !line.starts_with("trailer"))
            .map(|line| line[..10].parse().unwrap())
            .collect();

        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(pdf[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn long_documents_paginate() {
        let doc = doc(40, Currency::Usd);
        let pages = page_count(&doc);
        assert!(pages >= 2);
        assert!(as_text(&render_pdf(&doc)).contains(&format!("/Count {pages}")));
    }

    #[test]
    fn pages_cover_every_line_once() {
        let doc = doc(40, Currency::Usd);
        let pages = pages(&doc);
        assert_eq!(pages.iter().map(|page| page.len()).sum::<usize>(), doc.len());
        assert!(pages.iter().all(|page| !page.is_empty()));

        let bottom = PAGE_HEIGHT_MM - MARGIN_MM;
        for page in layout(&doc) {
            assert!(page.iter().all(|placed| placed.y_mm <= bottom));
        }
    }

    #[test]
    fn rupee_falls_back_to_latin() {
        let pdf = render_pdf(&doc(0, Currency::Pkr));
        assert!(as_text(&pdf).contains("(Total Payment: Rs0) Tj"));
    }
}
