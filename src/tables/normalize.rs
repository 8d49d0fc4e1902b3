//! Key folding for tariff lookups.
//!
//! Rate sheets and range tables come from spreadsheets maintained by hand, so
//! the same destination shows up as `"São Paulo"`, `"sao paulo"` or
//! `" SAO  PAULO "` depending on who last edited the file. Every key is
//! folded through [`fold_key`] once at load time and once per lookup, so both
//! sides always compare the same shape.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a lookup key: trim, strip diacritics, lowercase, and collapse
/// internal whitespace runs to a single space.
///
/// The fold is idempotent: `fold_key(fold_key(s)) == fold_key(s)`.
pub fn fold_key(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let mut folded = String::with_capacity(stripped.len());
    let mut pending_space = false;

    for c in stripped.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            folded.push(' ');
            pending_space = false;
        }
        for lower in c.to_lowercase() {
            folded.push(lower);
        }
    }

    folded
}

/// Strip every non-digit character from the input.
///
/// Used on postal-code columns and query parameters, where codes arrive as
/// `"01310-100"` or `"01310100"` interchangeably.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Parse a decimal that may use a comma as the decimal separator.
///
/// Rate sheets and the public API both carry Brazilian-locale numbers
/// (`"12,50"`); plain `"12.50"` is accepted as well. Returns `None` for
/// anything that does not parse to a finite number.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}
