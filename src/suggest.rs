//! Meal suggestions: a filter over the recipe book, not a ranking.

use serde::Serialize;

use crate::matcher::{Availability, PantryIndex, assess_with};
use crate::models::Recipe;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Approved recipes the pantry covers to at least `threshold`, in book order.
///
/// With an empty pantry there is no signal, so every approved recipe is returned.
#[must_use]
pub fn suggest<'a, S: AsRef<str>>(
    recipes: &'a [Recipe],
    pantry: &[S],
    threshold: f64,
) -> Vec<&'a Recipe> {
    suggest_with_availability(recipes, pantry, threshold)
        .into_iter()
        .map(|s| s.recipe)
        .collect()
}

/// A suggested recipe with what the pantry does and doesn't cover.
#[derive(Debug, Serialize)]
pub struct Suggestion<'a> {
    pub recipe: &'a Recipe,
    #[serde(flatten)]
    pub availability: Availability,
}

#[must_use]
pub fn suggest_with_availability<'a, S: AsRef<str>>(
    recipes: &'a [Recipe],
    pantry: &[S],
    threshold: f64,
) -> Vec<Suggestion<'a>> {
    let index = PantryIndex::new(pantry);
    recipes
        .iter()
        .filter(|r| r.approved)
        .map(|r| Suggestion {
            recipe: r,
            availability: assess_with(&index, r),
        })
        .filter(|s| index.is_empty() || s.availability.coverage >= threshold)
        .collect()
}
