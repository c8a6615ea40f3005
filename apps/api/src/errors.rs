use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only `Validation`, `NotFound` and `Unauthorized` carry caller-visible detail.
/// Every other variant is logged in full and answered with one uniform message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Not-found for an interview the caller cannot see. Never says whether it exists.
    pub fn interview_not_found() -> Self {
        AppError::NotFound("Interview not found".to_string())
    }

    pub fn question_not_found() -> Self {
        AppError::NotFound("Question/Interview not found".to_string())
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred while processing the interview";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                internal()
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                internal()
            }
            AppError::Speech(msg) => {
                tracing::error!("Speech synthesis error: {msg}");
                internal()
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                internal()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                internal()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}
