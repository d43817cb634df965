//! crates/study_companion_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like storage or LLM APIs.

use async_trait::async_trait;
use crate::domain::{Document, Flashcard, MediaType, QuizQuestion};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unsupported input: {0}")]
    Unsupported(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Provider returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("Nothing was generated: {0}")]
    NothingGenerated(String),
    /// The item is being replaced and cannot be used until that finishes.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for the whole document collection, read once and rewritten
/// as a single snapshot.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn load(&self) -> PortResult<Vec<Document>>;

    async fn save(&self, snapshot: &[Document]) -> PortResult<()>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts plain text from an uploaded file of an accepted media type.
    async fn extract_text(&self, bytes: &[u8], media_type: MediaType) -> PortResult<String>;
}

#[async_trait]
pub trait SummaryGenerationService: Send + Sync {
    /// Produces a markdown summary with `## ` section headings.
    async fn summarize(&self, document_text: &str) -> PortResult<String>;
}

#[async_trait]
pub trait NotesGenerationService: Send + Sync {
    /// Produces topic-grouped markdown study notes.
    async fn generate_study_notes(&self, document_content: &str) -> PortResult<String>;
}

#[async_trait]
pub trait FlashcardGenerationService: Send + Sync {
    async fn create_flashcards(&self, document_content: &str) -> PortResult<Vec<Flashcard>>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    async fn build_quiz(&self, document_text: &str) -> PortResult<Vec<QuizQuestion>>;
}
