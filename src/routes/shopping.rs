use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::AppState;
use crate::shopping_list::{build_list, export_text};

#[derive(Serialize, Debug)]
pub struct ShoppingView {
    pub items: Vec<String>,
    pub total: usize,
}

fn current_list(kitchen: &crate::session::Kitchen) -> Vec<String> {
    build_list(kitchen.recipes.all(), kitchen.pantry.items())
}

/// Ingredients across every recipe that the pantry doesn't cover.
///
/// # Errors
/// Never fails; kept fallible for the shared handler signature.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ShoppingView>> {
    let kitchen = state.kitchen.lock().await;
    let items = current_list(&kitchen);
    Ok(Json(ShoppingView {
        total: items.len(),
        items,
    }))
}

/// The same list as a printable text file.
///
/// # Errors
/// Never fails; kept fallible for the shared handler signature.
pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = {
        let kitchen = state.kitchen.lock().await;
        current_list(&kitchen)
    };
    let body = export_text(&items, chrono::Local::now().date_naive());
    let filename = format!(
        "attachment; filename=\"shopping-list-{}.txt\"",
        chrono::Local::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    ))
}
