//! What to buy: every recipe ingredient the pantry doesn't cover.

use chrono::NaiveDate;

use crate::matcher::PantryIndex;
use crate::models::Recipe;
use crate::normalize::dedup_normalized;

pub const EXPORT_HEADER: &str = "Fort Kitchen Command - Shopping List";

/// Union of all recipe ingredients (approved or not) in first-seen order,
/// distinct by normalized form, minus what the pantry covers.
#[must_use]
pub fn build_list<S: AsRef<str>>(recipes: &[Recipe], pantry: &[S]) -> Vec<String> {
    let index = PantryIndex::new(pantry);
    dedup_normalized(recipes.iter().flat_map(|r| r.ingredients.iter().cloned()))
        .into_iter()
        .filter(|i| !index.covers(i))
        .collect()
}

/// Plain-text rendering for clipboards and scripts.
///
/// ```text
/// Fort Kitchen Command - Shopping List
/// Generated: 2026-10-16
///
/// □ Bell Peppers
///
/// Total items: 1
/// ```
///
/// The line layout is relied upon by consumers that scrape it; keep it stable.
#[must_use]
pub fn export_text(items: &[String], generated: NaiveDate) -> String {
    let mut out = format!("{EXPORT_HEADER}\nGenerated: {}\n\n", generated.format("%Y-%m-%d"));
    for item in items {
        out.push_str("□ ");
        out.push_str(item);
        out.push('\n');
    }
    out.push_str(&format!("\nTotal items: {}", items.len()));
    out
}
