use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::AppState;

#[derive(Serialize, Debug)]
pub struct AppStateView {
    pub pantry_items: usize,
    pub recipes: usize,
    pub approved_recipes: usize,
    pub suggest_threshold: f64,
}

/// Counts and the active suggestion threshold.
///
/// # Errors
/// Never fails; kept fallible for the shared handler signature.
pub async fn get(State(state): State<AppState>) -> AppResult<Json<AppStateView>> {
    let kitchen = state.kitchen.lock().await;
    Ok(Json(AppStateView {
        pantry_items: kitchen.pantry.items().len(),
        recipes: kitchen.recipes.len(),
        approved_recipes: kitchen.recipes.all().iter().filter(|r| r.approved).count(),
        suggest_threshold: state.config.suggest_threshold,
    }))
}

/// Wipe pantry, recipes and their stored snapshots.
///
/// # Errors
/// 500 if the stored snapshots could not be cleared (memory is cleared anyway).
pub async fn reset(State(state): State<AppState>) -> AppResult<Json<AppStateView>> {
    let mut kitchen = state.kitchen.lock().await;
    kitchen.reset(&state.store).await?;
    tracing::warn!("kitchen reset");
    Ok(Json(AppStateView {
        pantry_items: 0,
        recipes: 0,
        approved_recipes: 0,
        suggest_threshold: state.config.suggest_threshold,
    }))
}
