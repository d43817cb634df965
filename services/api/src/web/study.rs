//! services/api/src/web/study.rs
//!
//! Handlers that generate, read, edit and export a document's summary,
//! notes and flashcards.

use crate::web::dto::{
    DocumentResponse, EditNotesRequest, FlashcardCheckRequest, FlashcardCheckResponse,
    SummarySectionsResponse,
};
use crate::web::rest::{port_error, HandlerError};
use crate::web::state::AppState;
use crate::wire::FlashcardRecord;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use study_companion_core::domain::Feature;
use study_companion_core::ports::{PortError, PortResult};
use study_companion_core::study::GenerationOutcome;
use tracing::error;
use uuid::Uuid;

/// Turns a finished generation into a response. Provider failures are
/// reported with a generic per-feature message.
pub(crate) fn generation_response(
    feature: Feature,
    result: PortResult<GenerationOutcome>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    match result {
        Ok(GenerationOutcome::Applied(document)) => Ok(Json(DocumentResponse::from(&document))),
        Ok(GenerationOutcome::Superseded) => Err((
            StatusCode::CONFLICT,
            format!("A newer {} request replaced this one.", feature),
        )),
        Err(e @ (PortError::NotFound(_) | PortError::NothingGenerated(_))) => Err(port_error(e)),
        Err(e) => {
            error!("Failed to generate {}: {}", feature, e);
            Err((
                StatusCode::BAD_GATEWAY,
                format!("Failed to generate {}. Please try again.", feature),
            ))
        }
    }
}

fn attachment(content_type: &'static str, file_name: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
}

//=========================================================================================
// Summary
//=========================================================================================

#[utoipa::path(
    post,
    path = "/documents/{id}/summary",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Summary generated", body = DocumentResponse),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Superseded by a newer request"),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn generate_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    generation_response(Feature::Summary, app_state.study.generate_summary(id).await)
}

/// The cached summary split into titled sections.
#[utoipa::path(
    get,
    path = "/documents/{id}/summary/sections",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Summary sections", body = SummarySectionsResponse),
        (status = 404, description = "Unknown document or no summary yet")
    )
)]
pub async fn summary_sections_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummarySectionsResponse>, HandlerError> {
    let sections = app_state
        .study
        .summary_sections(id)
        .await
        .map_err(port_error)?;
    Ok(Json(SummarySectionsResponse::from(sections)))
}

//=========================================================================================
// Notes
//=========================================================================================

#[utoipa::path(
    post,
    path = "/documents/{id}/notes",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Notes generated", body = DocumentResponse),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Superseded by a newer request or an edit"),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn generate_notes_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    generation_response(Feature::Notes, app_state.study.generate_notes(id).await)
}

/// Replace the notes with user-edited markdown.
#[utoipa::path(
    put,
    path = "/documents/{id}/notes",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = EditNotesRequest,
    responses(
        (status = 200, description = "Notes saved", body = DocumentResponse),
        (status = 404, description = "Unknown document")
    )
)]
pub async fn edit_notes_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditNotesRequest>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    let document = app_state
        .study
        .edit_notes(id, request.notes)
        .await
        .map_err(port_error)?;
    Ok(Json(DocumentResponse::from(&document)))
}

#[utoipa::path(
    get,
    path = "/documents/{id}/notes/export",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Notes as a markdown download", body = String, content_type = "text/markdown"),
        (status = 404, description = "Unknown document or no notes yet")
    )
)]
pub async fn export_notes_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let notes = app_state.study.notes(id).await.map_err(port_error)?;
    Ok(attachment("text/markdown; charset=utf-8", "study-notes.md", notes))
}

//=========================================================================================
// Flashcards
//=========================================================================================

#[utoipa::path(
    post,
    path = "/documents/{id}/flashcards",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Flashcards generated", body = DocumentResponse),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Superseded by a newer request"),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn generate_flashcards_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    generation_response(
        Feature::Flashcards,
        app_state.study.generate_flashcards(id).await,
    )
}

#[utoipa::path(
    get,
    path = "/documents/{id}/flashcards/export",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Flashcards as a JSON download", body = [FlashcardRecord]),
        (status = 404, description = "Unknown document or no flashcards yet")
    )
)]
pub async fn export_flashcards_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let cards = app_state.study.flashcards(id).await.map_err(port_error)?;
    let records: Vec<FlashcardRecord> = cards.iter().map(FlashcardRecord::from).collect();
    let json = serde_json::to_string_pretty(&records).map_err(|e| {
        error!("Failed to serialize flashcards: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(attachment("application/json", "flashcards.json", json))
}

/// Grade one flashcard answer and reveal the card's answer.
#[utoipa::path(
    post,
    path = "/documents/{id}/flashcards/{index}/check",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("index" = usize, Path, description = "Flashcard index")
    ),
    request_body = FlashcardCheckRequest,
    responses(
        (status = 200, description = "The graded answer", body = FlashcardCheckResponse),
        (status = 400, description = "Flashcard or option index out of range"),
        (status = 404, description = "Unknown document or no flashcards yet")
    )
)]
pub async fn check_flashcard_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<FlashcardCheckRequest>,
) -> Result<Json<FlashcardCheckResponse>, HandlerError> {
    let check = app_state
        .study
        .check_flashcard(id, index, request.option_index)
        .await
        .map_err(port_error)?;
    Ok(Json(FlashcardCheckResponse::from(check)))
}
