//! Comparison keys for free text.
//!
//! Everything that compares pantry items, ingredients or shopping entries goes
//! through [`normalize`]. The normalized form is a key only; callers keep the
//! original string for display.

use std::collections::HashSet;

/// Collapse every whitespace run to a single space and trim both ends.
#[must_use]
pub fn norm_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut ws = false;
    for ch in s.trim().chars() {
        if ch.is_whitespace() {
            if !ws {
                out.push(' ');
                ws = true;
            }
        } else {
            ws = false;
            out.push(ch);
        }
    }
    out
}

/// Lower-case, whitespace-collapsed, trimmed form of `s`.
#[must_use]
pub fn normalize(s: &str) -> String {
    norm_whitespace(&s.to_lowercase())
}

/// Keep the first occurrence of every normalized form, preserving order.
///
/// Entries that normalize to the empty string are dropped.
#[must_use]
pub fn dedup_normalized<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item: String = item.into();
        let key = normalize(&item);
        if key.is_empty() {
            continue;
        }
        if seen.insert(key) {
            out.push(item);
        }
    }
    out
}
