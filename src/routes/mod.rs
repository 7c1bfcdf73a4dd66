use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub mod app_state;
pub mod import;
pub mod pantry;
pub mod recipes;
pub mod shopping;
pub mod suggestions;

/// Present on a successful mutation whose snapshot could not be written.
pub const UNSAVED_HEADER: &str = "x-kitchen-unsaved";

/// Response headers for a mutation; empty when the snapshot landed.
pub(crate) fn persist_headers(saved: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if !saved {
        headers.insert(
            HeaderName::from_static(UNSAVED_HEADER),
            HeaderValue::from_static("change kept in memory but not saved"),
        );
    }
    headers
}
