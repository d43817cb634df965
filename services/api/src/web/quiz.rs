//! services/api/src/web/quiz.rs
//!
//! Handlers for quiz generation and the transient quiz attempt.

use crate::web::dto::{AnswerRequest, DocumentResponse, QuizAttemptResponse, QuizResultResponse};
use crate::web::rest::{port_error, HandlerError};
use crate::web::state::AppState;
use crate::web::study::generation_response;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use study_companion_core::domain::Feature;
use study_companion_core::ports::PortError;
use uuid::Uuid;

/// Submitting an incomplete attempt is a conflict with the attempt's state.
fn submission_error(e: PortError) -> HandlerError {
    match e {
        PortError::InvalidInput(message) => (StatusCode::CONFLICT, message),
        other => port_error(other),
    }
}

/// Generate a fresh, shuffled quiz. Any attempt in progress is discarded.
#[utoipa::path(
    post,
    path = "/documents/{id}/quiz",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Quiz generated", body = DocumentResponse),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Superseded by a newer request"),
        (status = 422, description = "No questions could be generated"),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn generate_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    generation_response(Feature::Quiz, app_state.study.generate_quiz(id).await)
}

#[utoipa::path(
    get,
    path = "/documents/{id}/quiz/attempt",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The current attempt", body = QuizAttemptResponse),
        (status = 404, description = "Unknown document or no quiz yet"),
        (status = 409, description = "A new quiz is being generated")
    )
)]
pub async fn quiz_attempt_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizAttemptResponse>, HandlerError> {
    let attempt = app_state.study.quiz_attempt(id).await.map_err(port_error)?;
    Ok(Json(QuizAttemptResponse::from(&attempt)))
}

/// Record (or change) the selected option for one question.
#[utoipa::path(
    put,
    path = "/documents/{id}/quiz/attempt/answers/{index}",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("index" = usize, Path, description = "Question index in the attempt's order")
    ),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = QuizAttemptResponse),
        (status = 400, description = "Question or option index out of range"),
        (status = 404, description = "Unknown document or no quiz yet"),
        (status = 409, description = "A new quiz is being generated")
    )
)]
pub async fn answer_question_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<QuizAttemptResponse>, HandlerError> {
    let attempt = app_state
        .study
        .answer_question(id, index, request.option_index)
        .await
        .map_err(port_error)?;
    Ok(Json(QuizAttemptResponse::from(&attempt)))
}

#[utoipa::path(
    post,
    path = "/documents/{id}/quiz/attempt/restart",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Questions reshuffled and answers cleared", body = QuizAttemptResponse),
        (status = 404, description = "Unknown document or no quiz yet"),
        (status = 409, description = "A new quiz is being generated")
    )
)]
pub async fn restart_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizAttemptResponse>, HandlerError> {
    let attempt = app_state.study.restart_quiz(id).await.map_err(port_error)?;
    Ok(Json(QuizAttemptResponse::from(&attempt)))
}

#[utoipa::path(
    post,
    path = "/documents/{id}/quiz/attempt/submit",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Scored attempt", body = QuizResultResponse),
        (status = 404, description = "Unknown document or no quiz yet"),
        (status = 409, description = "Not every question has been answered, or a new quiz is being generated")
    )
)]
pub async fn submit_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResultResponse>, HandlerError> {
    let result = app_state
        .study
        .submit_quiz(id)
        .await
        .map_err(submission_error)?;
    Ok(Json(QuizResultResponse::from(&result)))
}

/// Score the attempt and download the plain-text results report.
#[utoipa::path(
    post,
    path = "/documents/{id}/quiz/attempt/report",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Results as a text download", body = String, content_type = "text/plain"),
        (status = 404, description = "Unknown document or no quiz yet"),
        (status = 409, description = "Not every question has been answered, or a new quiz is being generated")
    )
)]
pub async fn quiz_report_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let result = app_state
        .study
        .submit_quiz(id)
        .await
        .map_err(submission_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"quiz-results.txt\"",
            ),
        ],
        result.report(),
    ))
}
