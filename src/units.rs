use regex::Regex;
use std::sync::LazyLock;

/// Measurement and size words recognised when re-segmenting pasted ingredient text.
///
/// Shorter spellings come first: the regex engine commits to the first alternative
/// that matches and the segment scanner absorbs any trailing letters.
pub const UNIT_WORDS: &[&str] = &[
    "cup",
    "cups",
    "tsp",
    "tbsp",
    "tablespoon",
    "teaspoon",
    "oz",
    "ounce",
    "lb",
    "pound",
    "can",
    "clove",
    "cloves",
    "small",
    "medium",
    "large",
];

/// Words that mark a pasted line as an ingredient line in quick-add text.
pub const QUICK_ADD_KEYWORDS: &[&str] = &[
    "cup",
    "tsp",
    "tbsp",
    "oz",
    "lb",
    "pound",
    "ounce",
    "tablespoon",
    "teaspoon",
];

// "<quantity> <unit>", no word boundary after the unit: "2 cupsflour" still counts.
pub static QTY_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alt = UNIT_WORDS.join("|");
    Regex::new(&format!(r"(?i)[0-9]+\s*(?:{alt})")).expect("unit vocabulary regex")
});

pub static BARE_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alt = UNIT_WORDS.join("|");
    Regex::new(&format!(r"(?i)^(?:{alt})$")).expect("bare unit regex")
});

pub static ALL_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits regex"));

#[inline]
#[must_use]
pub fn is_bare_unit(s: &str) -> bool {
    BARE_UNIT_RE.is_match(s.trim())
}
