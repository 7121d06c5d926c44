//! Text normalization for observation fields.
//!
//! Source files mix quoted prices, grouping separators, bracketed cells and
//! CJK date glyphs (`2024年1月5日`). Everything funnels through these
//! functions so the rules live in one place.

use chrono::{NaiveDate, NaiveDateTime};

/// Map full-width digits and punctuation to their ASCII forms.
fn fold_width(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        '．' => '.',
        '－' => '-',
        '／' => '/',
        other => other,
    }
}

fn is_wrapping(c: char) -> bool {
    matches!(c, '\'' | '"' | '[' | ']' | '「' | '」')
}

/// Strip quotes, brackets, whitespace and grouping separators from numeric text.
///
/// ```rust
/// use allocator_core::returns::normalize_numeric_text;
///
/// assert_eq!(normalize_numeric_text(" '1,234.50' "), "1234.50");
/// assert_eq!(normalize_numeric_text("[１２．５]"), "12.5");
/// ```
pub fn normalize_numeric_text(text: &str) -> String {
    text.chars()
        .map(fold_width)
        .filter(|&c| !(is_wrapping(c) || c.is_whitespace() || matches!(c, ',' | '，' | '_')))
        .collect()
}

/// Parse a price. Returns `None` unless the value is finite and non-negative.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned = normalize_numeric_text(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Label some sources prefix to dividend cells ("dividend").
const DIVIDEND_LABEL: &str = "股息";

/// Parse a dividend cell.
///
/// The `股息` label is stripped before parsing. `Some(0.0)` for absent or blank cells, `None` for text that is present
/// but not a finite non-negative number. Callers fall back to zero either way.
pub fn parse_dividend(text: Option<&str>) -> Option<f64> {
    let Some(text) = text else {
        return Some(0.0);
    };
    let cleaned = normalize_numeric_text(&text.replace(DIVIDEND_LABEL, ""));
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD` and `YYYY年MM月DD日`,
/// with or without zero padding, surrounding quotes or brackets, and an
/// optional time component.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let normalized: String = text
        .chars()
        .map(fold_width)
        .filter(|&c| !is_wrapping(c) && c != '日')
        .map(|c| if matches!(c, '年' | '月') { '-' } else { c })
        .collect();
    let normalized = normalized.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(normalized, fmt).ok())
        })
}
