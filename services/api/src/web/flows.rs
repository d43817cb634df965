//! services/api/src/web/flows.rs
//!
//! The generation flows exposed directly, with their own request and
//! response contracts. Nothing here touches the document store.

use crate::web::rest::HandlerError;
use crate::web::state::AppState;
use crate::wire::{
    DocumentContentInput, DocumentTextInput, FlashcardRecord, FlashcardsOutput, QuizOutput,
    QuizQuestionRecord, StudyNotesOutput, SummarizeOutput,
};
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use study_companion_core::domain::Feature;
use study_companion_core::ports::{
    FlashcardGenerationService, NotesGenerationService, PortError, QuizGenerationService,
    SummaryGenerationService,
};
use tracing::error;

/// Provider details stay in the log; callers get a generic message.
fn flow_error(feature: Feature, e: PortError) -> HandlerError {
    error!("The {} flow failed: {}", feature, e);
    (
        StatusCode::BAD_GATEWAY,
        format!("Failed to generate {}. Please try again.", feature),
    )
}

#[utoipa::path(
    post,
    path = "/flows/summarize",
    request_body = DocumentTextInput,
    responses(
        (status = 200, description = "Markdown summary", body = SummarizeOutput),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn summarize_flow_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<DocumentTextInput>,
) -> Result<Json<SummarizeOutput>, HandlerError> {
    let summary = app_state
        .study
        .flows()
        .summary
        .summarize(&input.document_text)
        .await
        .map_err(|e| flow_error(Feature::Summary, e))?;
    Ok(Json(SummarizeOutput { summary }))
}

#[utoipa::path(
    post,
    path = "/flows/notes",
    request_body = DocumentContentInput,
    responses(
        (status = 200, description = "Markdown study notes", body = StudyNotesOutput),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn notes_flow_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<DocumentContentInput>,
) -> Result<Json<StudyNotesOutput>, HandlerError> {
    let study_notes = app_state
        .study
        .flows()
        .notes
        .generate_study_notes(&input.document_content)
        .await
        .map_err(|e| flow_error(Feature::Notes, e))?;
    Ok(Json(StudyNotesOutput { study_notes }))
}

#[utoipa::path(
    post,
    path = "/flows/flashcards",
    request_body = DocumentContentInput,
    responses(
        (status = 200, description = "Interactive flashcards", body = FlashcardsOutput),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn flashcards_flow_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<DocumentContentInput>,
) -> Result<Json<FlashcardsOutput>, HandlerError> {
    let cards = app_state
        .study
        .flows()
        .flashcards
        .create_flashcards(&input.document_content)
        .await
        .map_err(|e| flow_error(Feature::Flashcards, e))?;
    Ok(Json(FlashcardsOutput {
        flashcards: cards.iter().map(FlashcardRecord::from).collect(),
    }))
}

/// Questions come back in the provider's order; shuffling happens only when
/// a quiz is generated for a stored document.
#[utoipa::path(
    post,
    path = "/flows/quiz",
    request_body = DocumentTextInput,
    responses(
        (status = 200, description = "Multiple-choice quiz", body = QuizOutput),
        (status = 502, description = "Generation failed")
    )
)]
pub async fn quiz_flow_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<DocumentTextInput>,
) -> Result<Json<QuizOutput>, HandlerError> {
    let quiz = app_state
        .study
        .flows()
        .quiz
        .build_quiz(&input.document_text)
        .await
        .map_err(|e| flow_error(Feature::Quiz, e))?;
    Ok(Json(QuizOutput {
        quiz: quiz.iter().map(QuizQuestionRecord::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_failures_hide_provider_details() {
        let (status, message) = flow_error(
            Feature::Flashcards,
            PortError::InvalidResponse("401 invalid api key sk-123".into()),
        );
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Failed to generate flashcards. Please try again.");
    }
}
