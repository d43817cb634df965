pub mod dto;
pub mod flows;
pub mod protocol;
pub mod quiz;
pub mod rest;
pub mod state;
pub mod study;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;

use axum::{
    routing::{get, post, put},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// All API routes, without CORS, body limits or the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/documents",
            get(rest::list_documents_handler).post(rest::upload_document_handler),
        )
        .route(
            "/documents/active",
            get(rest::active_document_handler).delete(rest::clear_selection_handler),
        )
        .route(
            "/documents/{id}",
            get(rest::get_document_handler).delete(rest::delete_document_handler),
        )
        .route("/documents/{id}/select", post(rest::select_document_handler))
        .route("/documents/{id}/summary", post(study::generate_summary_handler))
        .route(
            "/documents/{id}/summary/sections",
            get(study::summary_sections_handler),
        )
        .route(
            "/documents/{id}/notes",
            post(study::generate_notes_handler).put(study::edit_notes_handler),
        )
        .route("/documents/{id}/notes/export", get(study::export_notes_handler))
        .route(
            "/documents/{id}/flashcards",
            post(study::generate_flashcards_handler),
        )
        .route(
            "/documents/{id}/flashcards/export",
            get(study::export_flashcards_handler),
        )
        .route(
            "/documents/{id}/flashcards/{index}/check",
            post(study::check_flashcard_handler),
        )
        .route("/documents/{id}/quiz", post(quiz::generate_quiz_handler))
        .route("/documents/{id}/quiz/attempt", get(quiz::quiz_attempt_handler))
        .route(
            "/documents/{id}/quiz/attempt/answers/{index}",
            put(quiz::answer_question_handler),
        )
        .route(
            "/documents/{id}/quiz/attempt/restart",
            post(quiz::restart_quiz_handler),
        )
        .route(
            "/documents/{id}/quiz/attempt/submit",
            post(quiz::submit_quiz_handler),
        )
        .route(
            "/documents/{id}/quiz/attempt/report",
            post(quiz::quiz_report_handler),
        )
        .route("/flows/summarize", post(flows::summarize_flow_handler))
        .route("/flows/notes", post(flows::notes_flow_handler))
        .route("/flows/flashcards", post(flows::flashcards_flow_handler))
        .route("/flows/quiz", post(flows::quiz_flow_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
