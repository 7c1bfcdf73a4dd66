use crate::{
    logging::{access_log, log_payloads},
    models::AppState,
    routes::{UNSAVED_HEADER, app_state, import, pantry, recipes, shopping, suggestions},
};

use axum::http::{HeaderName, HeaderValue};
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

async fn healthz() -> Json<&'static str> {
    Json("ok")
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(UNSAVED_HEADER)]);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid CORS origin, allowing all origins");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    // Request-ID middleware comes first so everything downstream
    // has access to the x-request-id header.
    let request_id_layer = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .route("/healthz", get(healthz))
        .route("/app-state", get(app_state::get).delete(app_state::reset))
        .route("/pantry", get(pantry::list).post(pantry::add))
        .route("/pantry/detect", post(pantry::detect))
        .route("/pantry/{item}", delete(pantry::remove))
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route("/recipes/quick", post(recipes::quick_add))
        .route("/recipes/import", post(import::import_from_url))
        .route("/recipes/extract", post(import::extract_preview))
        .route(
            "/recipes/{id}",
            get(recipes::get)
                .delete(recipes::delete)
                .patch(recipes::update),
        )
        .route("/recipes/{id}/approval", post(recipes::toggle_approval))
        .route("/recipes/{id}/availability", get(recipes::availability))
        .route("/suggestions", get(suggestions::list))
        .route("/shopping", get(shopping::list))
        .route("/shopping/export", get(shopping::export))
        .with_state(state)
        .layer(from_fn(log_payloads))
        .layer(from_fn(access_log))
        .layer(request_id_layer)
        .layer(cors)
}
