//! Pantry-to-ingredient matching.
//!
//! Matching is bidirectional substring containment on normalized text, so
//! "Garlic" covers "2 cloves garlic, minced" and the other way round. Short
//! generic pantry entries over-match: "Rice" covers "licorice". That is the
//! accepted cost of matching loosely formatted text without a parser.

use serde::Serialize;

use crate::models::Recipe;
use crate::normalize::normalize;

/// Pantry entries pre-normalized once for repeated lookups.
#[derive(Debug, Clone)]
pub struct PantryIndex {
    keys: Vec<String>,
}

impl PantryIndex {
    #[must_use]
    pub fn new<S: AsRef<str>>(pantry: &[S]) -> Self {
        let keys = pantry
            .iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn covers(&self, ingredient: &str) -> bool {
        let ing = normalize(ingredient);
        if ing.is_empty() {
            return false;
        }
        self.keys
            .iter()
            .any(|p| ing.contains(p.as_str()) || p.contains(ing.as_str()))
    }
}

/// True when some pantry item contains the ingredient or is contained by it.
#[must_use]
pub fn covered<S: AsRef<str>>(ingredient: &str, pantry: &[S]) -> bool {
    PantryIndex::new(pantry).covers(ingredient)
}

/// Share of the recipe's ingredients the pantry covers, in `[0, 1]`.
///
/// A recipe without ingredients scores 0.
#[must_use]
pub fn coverage_ratio<S: AsRef<str>>(recipe: &Recipe, pantry: &[S]) -> f64 {
    ratio_with(&PantryIndex::new(pantry), &recipe.ingredients)
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio_with(index: &PantryIndex, ingredients: &[String]) -> f64 {
    let hits = ingredients.iter().filter(|i| index.covers(i)).count();
    hits as f64 / ingredients.len().max(1) as f64
}

/// What a recipe has and lacks against the current pantry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    pub available: Vec<String>,
    pub missing: Vec<String>,
    pub coverage: f64,
}

#[must_use]
pub fn assess<S: AsRef<str>>(recipe: &Recipe, pantry: &[S]) -> Availability {
    assess_with(&PantryIndex::new(pantry), recipe)
}

pub(crate) fn assess_with(index: &PantryIndex, recipe: &Recipe) -> Availability {
    let (available, missing): (Vec<String>, Vec<String>) = recipe
        .ingredients
        .iter()
        .cloned()
        .partition(|i| index.covers(i));
    let coverage = ratio_with(index, &recipe.ingredients);
    Availability {
        available,
        missing,
        coverage,
    }
}
