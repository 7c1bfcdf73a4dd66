use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::normalize::norm_whitespace;

/// Convert an HTML fragment to readable plain text.
pub fn html_to_plain_text(html: &str) -> String {
    static SCRIPT_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
    static STYLE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
    static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());

    let mut s = SCRIPT_RE.replace_all(html, " ").into_owned();
    s = STYLE_RE.replace_all(&s, " ").into_owned();
    s = TAG_RE.replace_all(&s, " ").into_owned();
    s = decode_entities_basic(&s);
    norm_whitespace(&s)
}

/// Minimal HTML entity decoding for strings lifted out of JSON-LD.
pub fn decode_entities_basic(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&#x27;", "'")
        .replace("&#8211;", "–")
        .replace("&#8212;", "—")
        .replace("&#8226;", "•")
        .replace("&nbsp;", " ")
}

/// Text pulled from structured data; may itself carry markup or entities.
pub fn clean_text(s: &str) -> String {
    if s.contains('<') {
        html_to_plain_text(s)
    } else {
        norm_whitespace(&decode_entities_basic(s))
    }
}

/// "Turkey Chili - Budget Bytes" -> "Turkey Chili".
///
/// Only a separator with whitespace on both sides counts, so "Stir-fry" survives.
pub fn strip_site_suffix(title: &str) -> String {
    static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[-–—|]\s+.*$").unwrap());
    SUFFIX_RE.replace(title.trim(), "").trim().to_string()
}

/// Visible text of an element, whitespace-collapsed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    norm_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}
