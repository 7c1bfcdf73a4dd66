use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use crate::error::{AppResult, KitchenError};
use crate::extract::{RecipeExtract, extract_recipe};
use crate::fetch::fetch_page;
use crate::models::{AppState, Category, DEFAULT_PREP_MINUTES, ImportFromUrlReq, Recipe};
use crate::routes::persist_headers;

pub const NO_INSTRUCTIONS_PLACEHOLDER: &str = "Visit the original recipe for detailed instructions";

#[derive(Deserialize, Debug)]
pub struct ExtractReq {
    pub url: String,
}

/// Fetch and extract while holding the import gate.
async fn fetch_and_extract(state: &AppState, url: &str) -> Result<RecipeExtract, KitchenError> {
    let Ok(_gate) = state.import_gate.try_lock() else {
        return Err(KitchenError::ImportBusy);
    };
    let html = fetch_page(
        &state.http,
        url,
        &state.config.user_agent,
        state.config.import_timeout(),
    )
    .await?;
    let extracted = extract_recipe(&html);
    tracing::info!(
        url,
        title = %extracted.title,
        ingredients = extracted.ingredients.len(),
        instructions = extracted.instructions.len(),
        "recipe page extracted"
    );
    Ok(extracted)
}

fn recipe_from_extract(
    extracted: RecipeExtract,
    url: &str,
    category: Option<&str>,
) -> Result<Recipe, KitchenError> {
    if extracted.ingredients.is_empty() {
        return Err(KitchenError::NothingExtracted);
    }
    let instructions = if extracted.instructions.is_empty() {
        vec![NO_INSTRUCTIONS_PLACEHOLDER.to_string()]
    } else {
        extracted.instructions
    };
    let mut recipe = Recipe {
        id: String::new(),
        name: extracted.title,
        category: Category::parse_lenient(category),
        ingredients: extracted.ingredients,
        instructions,
        prep_time: extracted.prep_time.unwrap_or(DEFAULT_PREP_MINUTES),
        approved: true,
        notes: String::new(),
        source_url: None,
        source_name: None,
    };
    recipe.set_source(Some(url.to_string()));
    recipe.notes = format!(
        "Imported from {}",
        recipe.source_name.as_deref().unwrap_or("External Recipe")
    );
    Ok(recipe)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>, handler: &str) -> AppResult<T> {
    let Json(v) = payload.map_err(|rejection| {
        let msg = rejection.body_text();
        tracing::info!("JSON deserialization failed in import::{}: {}", handler, msg);
        (StatusCode::UNPROCESSABLE_ENTITY, msg)
    })?;
    Ok(v)
}

/// Import a recipe from a web page and add it to the book.
///
/// # Errors
/// 409 while another import runs, 502 when the page can't be fetched, 422 when
/// no ingredients were found.
pub async fn import_from_url(
    State(state): State<AppState>,
    payload: Result<Json<ImportFromUrlReq>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Recipe>)> {
    let req = json_body(payload, "import_from_url")?;
    let recipe = fetch_and_extract(&state, &req.url)
        .await
        .and_then(|x| recipe_from_extract(x, req.url.trim(), req.category.as_deref()))
        .inspect_err(|e| tracing::warn!(url = %req.url, error = %e, "import failed"))?;

    let mut kitchen = state.kitchen.lock().await;
    let recipe = kitchen.recipes.insert(recipe);
    let saved = kitchen.persist_recipes(&state.store).await;
    tracing::info!(id = %recipe.id, source = ?recipe.source_name, "recipe imported");
    Ok((StatusCode::CREATED, persist_headers(saved), Json(recipe)))
}

/// Extract without saving, so the user can review the result.
///
/// # Errors
/// 409 while another import runs, 502 when the page can't be fetched.
pub async fn extract_preview(
    State(state): State<AppState>,
    payload: Result<Json<ExtractReq>, JsonRejection>,
) -> AppResult<Json<RecipeExtract>> {
    let req = json_body(payload, "extract_preview")?;
    let extracted = fetch_and_extract(&state, &req.url)
        .await
        .inspect_err(|e| tracing::warn!(url = %req.url, error = %e, "extraction failed"))?;
    Ok(Json(extracted))
}
