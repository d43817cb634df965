//! services/api/src/web/dto.rs
//!
//! Request and response payloads of the REST and WebSocket surfaces.

use crate::wire::{AiOutputsRecord, QuizQuestionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use study_companion_core::domain::{
    Document, Feature, FlashcardCheck, QuizResult, QuizResultEntry, SummarySection,
};
use study_companion_core::quiz::QuizAttempt;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Documents
//=========================================================================================

/// A document without its text, as shown in the document list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListItem {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    /// The study artifacts already generated for this document.
    pub generated: Vec<String>,
}

impl From<&Document> for DocumentListItem {
    fn from(document: &Document) -> Self {
        let outputs = &document.outputs;
        let generated = [
            (Feature::Summary, outputs.summary.is_some()),
            (Feature::Notes, outputs.notes.is_some()),
            (Feature::Flashcards, outputs.flashcards.is_some()),
            (Feature::Quiz, outputs.quiz.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(feature, _)| feature.as_str().to_string())
        .collect();

        Self {
            id: document.id,
            name: document.name.clone(),
            timestamp: document.created_at,
            word_count: document.word_count,
            generated,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentListItem>,
    pub active_document_id: Option<Uuid>,
}

impl DocumentListResponse {
    pub fn new(documents: &[Document], active_document_id: Option<Uuid>) -> Self {
        Self {
            documents: documents.iter().map(DocumentListItem::from).collect(),
            active_document_id,
        }
    }
}

/// A full document with its cached study artifacts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    pub content: String,
    pub ai_outputs: AiOutputsRecord,
    /// Artifacts with a generation request still in flight.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
}

impl DocumentResponse {
    pub fn with_pending(document: &Document, pending: &[Feature]) -> Self {
        Self {
            pending: pending.iter().map(|f| f.as_str().to_string()).collect(),
            ..Self::from(document)
        }
    }
}

impl From<&Document> for DocumentResponse {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
            timestamp: document.created_at,
            word_count: document.word_count,
            content: document.content.clone(),
            ai_outputs: AiOutputsRecord::from(&document.outputs),
            pending: Vec::new(),
        }
    }
}

//=========================================================================================
// Generated Artifacts
//=========================================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummarySectionDto {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummarySectionsResponse {
    pub sections: Vec<SummarySectionDto>,
}

impl From<Vec<SummarySection>> for SummarySectionsResponse {
    fn from(sections: Vec<SummarySection>) -> Self {
        Self {
            sections: sections
                .into_iter()
                .map(|s| SummarySectionDto {
                    title: s.title,
                    content: s.content,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EditNotesRequest {
    pub notes: String,
}

//=========================================================================================
// Quiz
//=========================================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardCheckRequest {
    pub option_index: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardCheckResponse {
    pub correct: bool,
    pub correct_option_index: usize,
    pub answer: String,
    pub explanation: String,
}

impl From<FlashcardCheck> for FlashcardCheckResponse {
    fn from(check: FlashcardCheck) -> Self {
        Self {
            correct: check.correct,
            correct_option_index: check.correct_option.get(),
            answer: check.answer,
            explanation: check.explanation,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub option_index: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptResponse {
    pub questions: Vec<QuizQuestionRecord>,
    /// Selected option per answered question index.
    pub answers: BTreeMap<usize, usize>,
    pub complete: bool,
}

impl From<&QuizAttempt> for QuizAttemptResponse {
    fn from(attempt: &QuizAttempt) -> Self {
        Self {
            questions: attempt
                .questions()
                .iter()
                .map(QuizQuestionRecord::from)
                .collect(),
            answers: attempt
                .answers()
                .iter()
                .map(|(question, option)| (*question, option.get()))
                .collect(),
            complete: attempt.is_complete(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultEntryDto {
    pub question: QuizQuestionRecord,
    pub selected_answer: Option<usize>,
}

impl From<&QuizResultEntry> for QuizResultEntryDto {
    fn from(entry: &QuizResultEntry) -> Self {
        Self {
            question: QuizQuestionRecord::from(&entry.question),
            selected_answer: entry.selected_answer.map(|o| o.get()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultResponse {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub answered_correctly: Vec<QuizResultEntryDto>,
    pub answered_incorrectly: Vec<QuizResultEntryDto>,
}

impl From<&QuizResult> for QuizResultResponse {
    fn from(result: &QuizResult) -> Self {
        Self {
            score: result.score,
            total: result.total,
            percentage: result.percentage(),
            answered_correctly: result
                .answered_correctly
                .iter()
                .map(QuizResultEntryDto::from)
                .collect(),
            answered_incorrectly: result
                .answered_incorrectly
                .iter()
                .map(QuizResultEntryDto::from)
                .collect(),
        }
    }
}
