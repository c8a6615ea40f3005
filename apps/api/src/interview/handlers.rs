//! Axum route handlers for the Interview API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::interview::models::{AnswerCreate, FinishOut, FollowupOut, InterviewOut, QuestionOut};
use crate::interview::validation::{require_text, UploadedDocument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SpeechStreamRequest {
    pub text: String,
}

/// POST /api/v1/interviews
///
/// Multipart form: `company`, `role`, `resume_file` (PDF).
pub async fn handle_create_interview(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<InterviewOut>, AppError> {
    let mut company = None;
    let mut role = None;
    let mut document = UploadedDocument {
        file_name: None,
        bytes: Default::default(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            warn!("Rejected multipart body: {e}");
            AppError::Validation("Malformed form data".to_string())
        })?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company" => company = Some(read_text(field).await?),
            "role" => role = Some(read_text(field).await?),
            "resume_file" => {
                document.file_name = field.file_name().map(str::to_string);
                document.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        warn!("Could not read résumé upload: {e}");
                        AppError::Validation("Could not read résumé file".to_string())
                    })?;
            }
            _ => {}
        }
    }

    let company = company.ok_or_else(|| AppError::Validation("company is required".to_string()))?;
    let role = role.ok_or_else(|| AppError::Validation("role is required".to_string()))?;

    let interview = state
        .interviews
        .create_interview(user_id, document, &company, &role)
        .await?;

    Ok(Json(interview))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| {
            warn!("Could not read form field: {e}");
            AppError::Validation("Malformed form field".to_string())
        })
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<InterviewOut>, AppError> {
    Ok(Json(
        state.interviews.get_interview(user_id, interview_id).await?,
    ))
}

/// GET /api/v1/interviews/:id/questions
pub async fn handle_list_questions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<Vec<QuestionOut>>, AppError> {
    Ok(Json(
        state.interviews.list_questions(user_id, interview_id).await?,
    ))
}

/// POST /api/v1/interviews/answer
///
/// Stores the answer and returns the single follow-up question it produced.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<AnswerCreate>,
) -> Result<Json<FollowupOut>, AppError> {
    Ok(Json(state.interviews.submit_answer(user_id, request).await?))
}

/// POST /api/v1/interviews/:id/finish
pub async fn handle_finish_interview(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<FinishOut>, AppError> {
    Ok(Json(
        state
            .interviews
            .finish_interview(user_id, interview_id)
            .await?,
    ))
}

/// POST /api/v1/speech/stream
///
/// Live playback path: audio chunks are forwarded as they arrive, nothing is stored.
pub async fn handle_speech_stream(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
    Json(request): Json<SpeechStreamRequest>,
) -> Result<Response, AppError> {
    let text = require_text("text", &request.text)?;
    let stream = state.speech.synthesize_stream(&text).await?;

    Ok((
        [(header::CONTENT_TYPE, state.audio_content_type.clone())],
        Body::from_stream(stream),
    )
        .into_response())
}
