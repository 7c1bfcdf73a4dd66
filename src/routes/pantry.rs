use axum::{
    Json,
    extract::{Multipart, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use crate::error::{AppResult, KitchenError};
use crate::models::{AddPantryItems, AppState};
use crate::routes::persist_headers;

#[derive(Serialize, Debug)]
pub struct PantryView {
    pub items: Vec<String>,
    /// Entries added by this request (empty for reads and removals).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
}

/// # Errors
/// Never fails; kept fallible for the shared handler signature.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<PantryView>> {
    let kitchen = state.kitchen.lock().await;
    Ok(Json(PantryView {
        items: kitchen.pantry.items().to_vec(),
        added: Vec::new(),
    }))
}

/// Add comma- or newline-separated items typed by the user.
///
/// # Errors
/// 422 on a malformed body, 400 when nothing but separators was sent.
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<AddPantryItems>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<PantryView>)> {
    let Json(req) = payload.map_err(|rejection| {
        let msg = rejection.body_text();
        tracing::info!("JSON deserialization failed in pantry::add: {}", msg);
        (StatusCode::UNPROCESSABLE_ENTITY, msg)
    })?;

    let mut kitchen = state.kitchen.lock().await;
    let added = kitchen.pantry.add_manual(&req.items.into_text());
    if added.is_empty() {
        return Err(KitchenError::Validation("no pantry items given".to_string()).into());
    }
    let saved = kitchen.persist_pantry(&state.store).await;
    tracing::info!(added = added.len(), "pantry items added");
    Ok((
        StatusCode::CREATED,
        persist_headers(saved),
        Json(PantryView {
            items: kitchen.pantry.items().to_vec(),
            added,
        }),
    ))
}

/// Remove every entry equal to the path segment.
///
/// # Errors
/// 404 if no entry matched.
pub async fn remove(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> AppResult<(HeaderMap, Json<PantryView>)> {
    let mut kitchen = state.kitchen.lock().await;
    let removed = kitchen.pantry.remove(&item)?;
    let saved = kitchen.persist_pantry(&state.store).await;
    tracing::info!(item = %item, removed, "pantry item removed");
    Ok((
        persist_headers(saved),
        Json(PantryView {
            items: kitchen.pantry.items().to_vec(),
            added: Vec::new(),
        }),
    ))
}

/// Accept a pantry photo and add whatever the detector reports.
///
/// Expects a multipart field named `image` (any field with data is accepted).
///
/// # Errors
/// 400 when the upload is malformed or carries no file.
pub async fn detect(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> AppResult<(HeaderMap, Json<PantryView>)> {
    let mut image: Option<Vec<u8>> = None;
    while let Some(field) = mp.next_field().await? {
        let is_image = field.name() == Some("image");
        let bytes = field.bytes().await?;
        if is_image || image.is_none() {
            image = Some(bytes.to_vec());
        }
        if is_image {
            break;
        }
    }
    let image = image.ok_or((StatusCode::BAD_REQUEST, "no image uploaded".to_string()))?;

    let detected = state.detector.detect(&image);
    let mut kitchen = state.kitchen.lock().await;
    let added = kitchen.pantry.add_detected(detected);
    let saved = added.is_empty() || kitchen.persist_pantry(&state.store).await;
    tracing::info!(added = added.len(), bytes = image.len(), "pantry photo processed");
    Ok((
        persist_headers(saved),
        Json(PantryView {
            items: kitchen.pantry.items().to_vec(),
            added,
        }),
    ))
}
