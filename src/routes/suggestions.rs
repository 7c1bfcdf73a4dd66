use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::config::parse_threshold;
use crate::error::{AppResult, KitchenError};
use crate::matcher::Availability;
use crate::models::{AppState, Recipe};
use crate::suggest::suggest_with_availability;

#[derive(Deserialize, Debug, Default)]
pub struct SuggestQuery {
    pub threshold: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SuggestionView {
    pub recipe: Recipe,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Serialize, Debug)]
pub struct SuggestionsResponse {
    pub threshold: f64,
    pub pantry_empty: bool,
    pub suggestions: Vec<SuggestionView>,
}

/// Approved recipes the pantry covers well enough.
///
/// # Errors
/// 400 for a threshold outside `[0, 1]`.
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<SuggestQuery>,
) -> AppResult<Json<SuggestionsResponse>> {
    let threshold = match q.threshold.as_deref() {
        Some(t) => parse_threshold(t).map_err(KitchenError::Validation)?,
        None => state.config.suggest_threshold,
    };

    let kitchen = state.kitchen.lock().await;
    let pantry = kitchen.pantry.items();
    let suggestions = suggest_with_availability(kitchen.recipes.all(), pantry, threshold)
        .into_iter()
        .map(|s| SuggestionView {
            recipe: s.recipe.clone(),
            availability: s.availability,
        })
        .collect();

    Ok(Json(SuggestionsResponse {
        threshold,
        pantry_empty: pantry.is_empty(),
        suggestions,
    }))
}
