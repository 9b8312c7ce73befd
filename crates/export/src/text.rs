use crate::lines::{DocumentLines, Line};
use crate::pdf;

const PAGE_BREAK: char = '\u{c}';

/// Split the document into pages, breaking where the PDF export does.
pub fn paginate(doc: &DocumentLines) -> Vec<&[Line]> {
    pdf::pages(doc)
}

/// Plain-text rendering. Pages are separated by a form feed and carry a
/// `Page n of m` footer.
pub fn render_text(doc: &DocumentLines) -> String {
    let pages = paginate(doc);
    let total = pages.len();

    let mut out = String::new();
    for (idx, page) in pages.iter().enumerate() {
        if idx > 0 {
            out.push(PAGE_BREAK);
        }
        for line in page.iter() {
            match line {
                Line::Heading(text) => out.push_str(text),
                Line::Text(text) => {
                    out.push_str("  ");
                    out.push_str(text);
                }
                Line::Gap => {}
            }
            out.push('\n');
        }
        out.push_str(&format!("\nPage {} of {}\n", idx + 1, total));
    }
    out
}
