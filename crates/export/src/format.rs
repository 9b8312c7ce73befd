//! Presentation formatting shared by every export.

use chrono::{DateTime, Utc};

/// Amount with thousands separators and at most three fraction digits,
/// trailing zeros dropped: `1234.5` renders as `1,234.5`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Optional amount as entered, empty when unset.
pub fn format_raw(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `M/D/YYYY`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// `hh:mm AM`.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

/// `M/D/YYYY, hh:mm AM`, used for snapshot history.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    format!("{}, {}", format_date(at), format_time(at))
}

/// Download filename derived from the project title. Characters that are
/// unsafe in paths or HTTP headers become `_`.
pub fn filename(project_title: &str, extension: &str) -> String {
    let title = project_title.trim();
    let stem: String = if title.is_empty() {
        "untitled".to_string()
    } else {
        title
            .chars()
            .map(|c| match c {
                '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' | ';' => '_',
                c if c.is_ascii_graphic() || c == ' ' => c,
                _ => '_',
            })
            .collect()
    };
    format!("invoice-{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234567.5), "1,234,567.5");
        assert_eq!(format_amount(-2500.125), "-2,500.125");
        assert_eq!(format_amount(12.0004), "12");
    }

    #[test]
    fn raw_amounts_match_input() {
        assert_eq!(format_raw(Some(1500.0)), "1500");
        assert_eq!(format_raw(Some(99.5)), "99.5");
        assert_eq!(format_raw(None), "");
    }

    #[test]
    fn dates_use_us_layout() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 15, 4, 0).unwrap();
        assert_eq!(format_date(at), "3/7/2025");
        assert_eq!(format_time(at), "03:04 PM");
        assert_eq!(format_date_time(at), "3/7/2025, 03:04 PM");
    }

    #[test]
    fn filenames_are_safe() {
        assert_eq!(filename("", "pdf"), "invoice-untitled.pdf");
        assert_eq!(filename("  Shop Redesign ", "txt"), "invoice-Shop Redesign.txt");
        assert_eq!(filename("a/b\"c", "pdf"), "invoice-a_b_c.pdf");
        assert_eq!(filename("Café", "html"), "invoice-Caf_.html");
    }
}
