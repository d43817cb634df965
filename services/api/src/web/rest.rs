//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the document endpoints, the shared error
//! mapping, and the master definition for the OpenAPI specification.

use crate::web::dto::{
    AnswerRequest, DocumentListItem, DocumentListResponse, DocumentResponse, EditNotesRequest,
    FlashcardCheckRequest, FlashcardCheckResponse, QuizAttemptResponse, QuizResultEntryDto, QuizResultResponse, SummarySectionDto,
    SummarySectionsResponse,
};
use crate::web::state::AppState;
use crate::web::{flows, quiz, study};
use crate::wire::{
    AiOutputsRecord, DocumentContentInput, DocumentTextInput, FlashcardRecord, FlashcardsOutput,
    QuizOutput, QuizQuestionRecord, StudyNotesOutput, SummarizeOutput,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use study_companion_core::ports::PortError;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_documents_handler,
        upload_document_handler,
        active_document_handler,
        clear_selection_handler,
        get_document_handler,
        delete_document_handler,
        select_document_handler,
        study::generate_summary_handler,
        study::summary_sections_handler,
        study::generate_notes_handler,
        study::edit_notes_handler,
        study::export_notes_handler,
        study::generate_flashcards_handler,
        study::export_flashcards_handler,
        study::check_flashcard_handler,
        quiz::generate_quiz_handler,
        quiz::quiz_attempt_handler,
        quiz::answer_question_handler,
        quiz::restart_quiz_handler,
        quiz::submit_quiz_handler,
        quiz::quiz_report_handler,
        flows::summarize_flow_handler,
        flows::notes_flow_handler,
        flows::flashcards_flow_handler,
        flows::quiz_flow_handler,
    ),
    components(
        schemas(
            DocumentListItem, DocumentListResponse, DocumentResponse, AiOutputsRecord,
            FlashcardRecord, QuizQuestionRecord, SummarySectionDto, SummarySectionsResponse,
            EditNotesRequest, AnswerRequest, FlashcardCheckRequest, FlashcardCheckResponse, QuizAttemptResponse, QuizResultEntryDto,
            QuizResultResponse, DocumentTextInput, DocumentContentInput, SummarizeOutput,
            StudyNotesOutput, FlashcardsOutput, QuizOutput,
        )
    ),
    tags(
        (name = "Study Companion API", description = "Upload documents and generate summaries, notes, flashcards and quizzes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// The error half of every handler's result.
pub type HandlerError = (StatusCode, String);

/// Maps a port error to a status code carrying the error's own message.
pub fn port_error(e: PortError) -> HandlerError {
    let status = match &e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unsupported(_) | PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::ExtractionFailed(_) | PortError::NothingGenerated(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PortError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    }
    (status, message_of(e))
}

fn message_of(e: PortError) -> String {
    match e {
        PortError::NotFound(m)
        | PortError::Unsupported(m)
        | PortError::InvalidInput(m)
        | PortError::ExtractionFailed(m)
        | PortError::InvalidResponse(m)
        | PortError::NothingGenerated(m)
        | PortError::Conflict(m)
        | PortError::Unexpected(m) => m,
    }
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// List all documents in upload order, together with the active selection.
#[utoipa::path(
    get,
    path = "/documents",
    responses((status = 200, description = "All documents", body = DocumentListResponse))
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<DocumentListResponse> {
    let (documents, active) = app_state.study.store().snapshot().await;
    Json(DocumentListResponse::new(&documents, active))
}

/// Upload a document.
///
/// Accepts a multipart/form-data request with a single PDF or plain-text file
/// part. The extracted document becomes the active one.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Unsupported file type, missing file, or no extractable text"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 422, description = "The file could not be parsed")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), format!("Failed to read multipart data: {}", e.body_text())))?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let file_name = field.file_name().unwrap_or("untitled.txt").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(|e| {
        let status = e.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            (
                status,
                format!(
                    "File is larger than the {} byte upload limit",
                    app_state.config.max_upload_bytes
                ),
            )
        } else {
            (status, format!("Failed to read file bytes: {}", e.body_text()))
        }
    })?;

    let document = app_state
        .study
        .ingest(&file_name, &content_type, &data)
        .await
        .map_err(|e| {
            warn!("Rejected upload '{}': {}", file_name, e);
            port_error(e)
        })?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(&document))))
}

/// Fetch the active document.
#[utoipa::path(
    get,
    path = "/documents/active",
    responses(
        (status = 200, description = "The active document", body = DocumentResponse),
        (status = 404, description = "No document is active")
    )
)]
pub async fn active_document_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    let document = app_state.study.store().active().await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            "No document is active".to_string(),
        )
    })?;
    let pending = app_state.study.pending_features(document.id);
    Ok(Json(DocumentResponse::with_pending(&document, &pending)))
}

/// Return to the document list by clearing the active selection.
#[utoipa::path(
    delete,
    path = "/documents/active",
    responses((status = 204, description = "Selection cleared"))
)]
pub async fn clear_selection_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.study.store().clear_selection().await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 404, description = "Unknown document")
    )
)]
pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    let document = app_state.study.store().get(id).await.map_err(port_error)?;
    let pending = app_state.study.pending_features(id);
    Ok(Json(DocumentResponse::with_pending(&document, &pending)))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document removed"),
        (status = 404, description = "Unknown document")
    )
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .study
        .remove_document(id)
        .await
        .map_err(port_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Make a document the active one.
#[utoipa::path(
    post,
    path = "/documents/{id}/select",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The newly active document", body = DocumentResponse),
        (status = 404, description = "Unknown document")
    )
)]
pub async fn select_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, HandlerError> {
    let document = app_state.study.store().select(id).await.map_err(port_error)?;
    let pending = app_state.study.pending_features(id);
    Ok(Json(DocumentResponse::with_pending(&document, &pending)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_statuses() {
        let cases = [
            (PortError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PortError::Unsupported("x".into()), StatusCode::BAD_REQUEST),
            (PortError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (PortError::ExtractionFailed("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PortError::NothingGenerated("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PortError::InvalidResponse("x".into()), StatusCode::BAD_GATEWAY),
            (PortError::Conflict("x".into()), StatusCode::CONFLICT),
            (PortError::Unexpected("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(port_error(error), (status, "x".to_string()));
        }
    }

    #[test]
    fn openapi_lists_the_document_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/documents"));
        assert!(doc.paths.paths.contains_key("/documents/{id}/quiz/attempt/submit"));
        assert!(doc.paths.paths.contains_key("/flows/summarize"));
        assert!(doc
            .paths
            .paths
            .contains_key("/documents/{id}/flashcards/{index}/check"));
    }
}
