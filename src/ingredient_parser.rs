use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::dedup_normalized;
use crate::units::{ALL_DIGITS_RE, QTY_UNIT_RE, QUICK_ADD_KEYWORDS, is_bare_unit};

const SEP: char = '|';

static CHECKBOX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[▢☐□☑☒✓✔]").unwrap());
// Unit toggles scraped along with the list, e.g. "US Customary - Metric"
static UNIT_TOGGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)US Customary.*?Metric").unwrap());
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ingredients").unwrap());
static SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|,\n]+").unwrap());

/// Turn a pasted or typed ingredient blob into distinct ingredient strings.
///
/// Order is first-seen; uniqueness is by normalized form. An empty result means
/// the ingredients are unknown, not that the dish needs none.
#[must_use]
pub fn clean_ingredients(raw: &str) -> Vec<String> {
    let s = CHECKBOX_RE.replace_all(raw, "");
    let s = UNIT_TOGGLE_RE.replace_all(&s, "");
    let s = HEADER_RE.replace_all(&s, "");
    let s = insert_separators(s.trim());

    let fragments = SPLIT_RE
        .split(&s)
        .map(str::trim)
        .filter(|f| keep_fragment(f))
        .map(str::to_string);

    dedup_normalized(fragments)
}

fn keep_fragment(f: &str) -> bool {
    f.chars().count() > 3 && !ALL_DIGITS_RE.is_match(f) && !is_bare_unit(f)
}

/// Re-insert separators into text where ingredients were glued together,
/// e.g. "2 cups flour1 tsp salt" becomes "2 cups flour|1 tsp salt|".
///
/// A segment starts at "<quantity> <unit>" and runs (at least one character) up to
/// the next digit or the end of input. Segments that hit punctuation outside
/// `[word space . - , ( )]` are abandoned and the scan resumes one character later.
fn insert_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut copied = 0;
    let mut from = 0;

    while from < text.len() {
        let Some(m) = QTY_UNIT_RE.find_at(text, from) else {
            break;
        };
        if let Some(end) = segment_end(text, m.end()) {
            out.push_str(&text[copied..end]);
            out.push(SEP);
            copied = end;
            from = end;
        } else {
            // match always starts on an ASCII digit
            from = m.start() + 1;
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn segment_end(text: &str, start: usize) -> Option<usize> {
    let mut iter = text[start..].char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if !is_segment_char(c) {
            return None;
        }
        match iter.peek() {
            None => return Some(text.len()),
            Some((_, next)) if next.is_ascii_digit() => return Some(start + i + c.len_utf8()),
            Some(_) => {}
        }
    }
    None
}

fn is_segment_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || matches!(c, '.' | '-' | ',' | '(' | ')')
}

/* ---------- Quick add ---------- */

/// A recipe roughed out of one pasted block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
}

const QUICK_MAX_INGREDIENTS: usize = 20;
const QUICK_FALLBACK_LINES: usize = 9;
pub const QUICK_PLACEHOLDER: &str = "See recipe text for ingredients";

/// First non-empty line is the name; ingredient lines carry a unit keyword,
/// start with a digit, or look like a bullet.
#[must_use]
pub fn parse_quick_text(text: &str) -> QuickRecipe {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let name = lines
        .first()
        .map_or_else(|| "Quick Recipe".to_string(), |l| (*l).to_string());
    let body = lines.get(1..).unwrap_or_default();

    let mut picked: Vec<&str> = body
        .iter()
        .copied()
        .filter(|l| looks_like_ingredient(l))
        .take(QUICK_MAX_INGREDIENTS)
        .collect();
    if picked.is_empty() {
        picked = body.iter().copied().take(QUICK_FALLBACK_LINES).collect();
    }

    let mut ingredients = dedup_normalized(
        picked
            .into_iter()
            .map(|l| l.trim_start_matches(['•', '-', '–', '—', '·', '*', ' ']).trim()),
    );
    if ingredients.is_empty() {
        ingredients.push(QUICK_PLACEHOLDER.to_string());
    }

    QuickRecipe { name, ingredients }
}

fn looks_like_ingredient(line: &str) -> bool {
    let lower = line.to_lowercase();
    QUICK_ADD_KEYWORDS.iter().any(|k| lower.contains(k))
        || line.starts_with(|c: char| c.is_ascii_digit())
        || line.contains('•')
        || line.contains('-')
}
