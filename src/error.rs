use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Domain failures raised by the kitchen aggregates and the import pipeline.
#[derive(Debug, thiserror::Error)]
pub enum KitchenError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("snapshot {key} is unreadable: {reason}")]
    StorageCorrupt { key: String, reason: String },

    #[error("could not fetch recipe page: {0}")]
    ImportFetch(String),

    #[error("could not parse recipe page: {0}")]
    ImportParse(String),

    #[error("another import is already running")]
    ImportBusy,

    #[error("no ingredients found on the page")]
    NothingExtracted,

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

impl KitchenError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ImportFetch(_) => StatusCode::BAD_GATEWAY,
            Self::ImportBusy => StatusCode::CONFLICT,
            Self::NothingExtracted => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StorageCorrupt { .. } | Self::ImportParse(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    /// Just a status code, empty body.
    Status(StatusCode),
    /// Status code with a JSON `{ "error": msg }` body.
    Msg(StatusCode, String),
    /// Internal error -> 500 with JSON body; logged.
    Anyhow(anyhow::Error),
}

impl From<StatusCode> for AppError {
    fn from(code: StatusCode) -> Self {
        Self::Status(code)
    }
}

impl From<(StatusCode, String)> for AppError {
    fn from((code, msg): (StatusCode, String)) -> Self {
        Self::Msg(code, msg)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Anyhow(e)
    }
}

impl From<KitchenError> for AppError {
    fn from(e: KitchenError) -> Self {
        let code = e.status();
        if code.is_server_error() {
            Self::Anyhow(e.into())
        } else {
            Self::Msg(code, e.to_string())
        }
    }
}

/* ---- Narrow, explicit conversions so `?` works everywhere ---- */

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Anyhow(e.into())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::Msg(StatusCode::BAD_REQUEST, e.body_text())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Status(code) => code.into_response(),
            Self::Msg(code, msg) => {
                if code.is_client_error() {
                    tracing::info!(status = %code, "{msg}");
                }
                (code, Json(ErrBody { error: msg })).into_response()
            }
            Self::Anyhow(err) => {
                tracing::error!("{:#}", err);
                let body = Json(ErrBody {
                    error: err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
