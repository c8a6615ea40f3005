pub mod health;

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::auth::USER_ID_HEADER;
use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, media_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interviews",
            post(handlers::handle_create_interview)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/v1/interviews/answer",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview),
        )
        .route(
            "/api/v1/interviews/:id/questions",
            get(handlers::handle_list_questions),
        )
        .route(
            "/api/v1/interviews/:id/finish",
            post(handlers::handle_finish_interview),
        )
        // Speech API
        .route("/api/v1/speech/stream", post(handlers::handle_speech_stream))
        // Synthesized audio
        .nest_service("/media", ServeDir::new(media_dir))
        .with_state(state)
}

/// Restricts browser access to the configured origins.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ]))
}
