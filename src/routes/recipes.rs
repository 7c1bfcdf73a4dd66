use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};

use crate::error::{AppResult, KitchenError};
use crate::ingredient_parser::parse_quick_text;
use crate::matcher::{Availability, assess};
use crate::models::{AppState, Category, NewRecipe, QuickAdd, Recipe, RecipeFilter, UpdateRecipe};
use crate::routes::persist_headers;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>, handler: &str) -> AppResult<T> {
    let Json(v) = payload.map_err(|rejection| {
        let msg = rejection.body_text();
        tracing::info!("JSON deserialization failed in recipes::{}: {}", handler, msg);
        (StatusCode::UNPROCESSABLE_ENTITY, msg)
    })?;
    Ok(v)
}

/// `?category=` filter; absent, empty or `all` means no filter.
fn parse_filter(filter: &RecipeFilter) -> Result<Option<Category>, KitchenError> {
    match filter.category.as_deref().map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(c) => Category::parse(c)
            .map(Some)
            .ok_or_else(|| KitchenError::Validation(format!("unknown category {c:?}"))),
    }
}

/// List recipes, optionally limited to one category.
///
/// # Errors
/// 400 for an unknown category.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<RecipeFilter>,
) -> AppResult<Json<Vec<Recipe>>> {
    let category = parse_filter(&filter)?;
    let kitchen = state.kitchen.lock().await;
    Ok(Json(kitchen.recipes.list(category)))
}

/// # Errors
/// 404 for an unknown id.
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Recipe>> {
    let kitchen = state.kitchen.lock().await;
    let recipe = kitchen
        .recipes
        .get(&id)
        .cloned()
        .ok_or_else(|| KitchenError::NotFound(format!("recipe {id}")))?;
    Ok(Json(recipe))
}

/// Add a manually entered recipe. Ingredients go through the cleaner.
///
/// # Errors
/// 400 when name, ingredients or a positive prep time are missing.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Recipe>)> {
    let new = json_body(payload, "create")?;
    let mut kitchen = state.kitchen.lock().await;
    let recipe = kitchen.recipes.add(new)?;
    let saved = kitchen.persist_recipes(&state.store).await;
    tracing::info!(id = %recipe.id, ingredients = recipe.ingredients.len(), "recipe added");
    Ok((StatusCode::CREATED, persist_headers(saved), Json(recipe)))
}

/// Add a recipe roughed out of pasted text.
///
/// # Errors
/// 400 when the text is blank.
pub async fn quick_add(
    State(state): State<AppState>,
    payload: Result<Json<QuickAdd>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Recipe>)> {
    let req = json_body(payload, "quick_add")?;
    if req.text.trim().is_empty() {
        return Err(KitchenError::Validation("recipe text is required".to_string()).into());
    }
    let quick = parse_quick_text(&req.text);
    let mut kitchen = state.kitchen.lock().await;
    let recipe = kitchen.recipes.add_quick(quick, req.source_url);
    let saved = kitchen.persist_recipes(&state.store).await;
    tracing::info!(id = %recipe.id, "recipe quick-added");
    Ok((StatusCode::CREATED, persist_headers(saved), Json(recipe)))
}

/// # Errors
/// 404 for an unknown id, 400 when the edit is invalid (nothing is changed).
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRecipe>, JsonRejection>,
) -> AppResult<(HeaderMap, Json<Recipe>)> {
    let up = json_body(payload, "update")?;
    let mut kitchen = state.kitchen.lock().await;
    let recipe = kitchen.recipes.update(&id, up)?;
    let saved = kitchen.persist_recipes(&state.store).await;
    Ok((persist_headers(saved), Json(recipe)))
}

/// # Errors
/// 404 for an unknown id.
pub async fn toggle_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(HeaderMap, Json<Recipe>)> {
    let mut kitchen = state.kitchen.lock().await;
    let recipe = kitchen.recipes.toggle_approval(&id)?;
    let saved = kitchen.persist_recipes(&state.store).await;
    tracing::info!(id = %recipe.id, approved = recipe.approved, "approval toggled");
    Ok((persist_headers(saved), Json(recipe)))
}

/// # Errors
/// 404 for an unknown id.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, HeaderMap)> {
    let mut kitchen = state.kitchen.lock().await;
    let removed = kitchen.recipes.delete(&id)?;
    let saved = kitchen.persist_recipes(&state.store).await;
    tracing::info!(id = %removed.id, "recipe deleted");
    Ok((StatusCode::NO_CONTENT, persist_headers(saved)))
}

/// What the pantry covers for one recipe.
///
/// # Errors
/// 404 for an unknown id.
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Availability>> {
    let kitchen = state.kitchen.lock().await;
    let recipe = kitchen
        .recipes
        .get(&id)
        .ok_or_else(|| KitchenError::NotFound(format!("recipe {id}")))?;
    Ok(Json(assess(recipe, kitchen.pantry.items())))
}
