//! services/api/src/wire.rs
//!
//! Serde shapes shared by the generation flows, the persisted document
//! collection, and the HTTP layer. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_companion_core::domain::{Document, Flashcard, GeneratedOutputs, QuizQuestion};
use study_companion_core::ports::PortResult;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Study Artifacts
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRecord {
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub options: Vec<String>,
    pub correct_option_index: i64,
}

impl FlashcardRecord {
    pub fn to_domain(self) -> PortResult<Flashcard> {
        Flashcard::new(
            self.question,
            self.answer,
            self.explanation,
            self.options,
            self.correct_option_index,
        )
    }
}

impl From<&Flashcard> for FlashcardRecord {
    fn from(card: &Flashcard) -> Self {
        Self {
            question: card.question.clone(),
            answer: card.answer.clone(),
            explanation: card.explanation.clone(),
            options: card.options.to_vec(),
            correct_option_index: card.correct_option.get() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: i64,
    pub explanation: String,
}

impl QuizQuestionRecord {
    pub fn to_domain(self) -> PortResult<QuizQuestion> {
        QuizQuestion::new(
            self.question,
            self.options,
            self.correct_answer_index,
            self.explanation,
        )
    }
}

impl From<&QuizQuestion> for QuizQuestionRecord {
    fn from(question: &QuizQuestion) -> Self {
        Self {
            question: question.question.clone(),
            options: question.options.to_vec(),
            correct_answer_index: question.correct_answer.get() as i64,
            explanation: question.explanation.clone(),
        }
    }
}

//=========================================================================================
// Persisted Documents
//=========================================================================================

/// The cached generation results of one document. Absent slots are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiOutputsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<FlashcardRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestionRecord>>,
}

impl AiOutputsRecord {
    pub fn to_domain(self) -> PortResult<GeneratedOutputs> {
        Ok(GeneratedOutputs {
            summary: self.summary,
            notes: self.notes,
            flashcards: self
                .flashcards
                .map(|cards| {
                    cards
                        .into_iter()
                        .map(FlashcardRecord::to_domain)
                        .collect::<PortResult<Vec<_>>>()
                })
                .transpose()?,
            quiz: self
                .quiz
                .map(|quiz| {
                    quiz.into_iter()
                        .map(QuizQuestionRecord::to_domain)
                        .collect::<PortResult<Vec<_>>>()
                })
                .transpose()?,
        })
    }
}

impl From<&GeneratedOutputs> for AiOutputsRecord {
    fn from(outputs: &GeneratedOutputs) -> Self {
        Self {
            summary: outputs.summary.clone(),
            notes: outputs.notes.clone(),
            flashcards: outputs
                .flashcards
                .as_ref()
                .map(|cards| cards.iter().map(FlashcardRecord::from).collect()),
            quiz: outputs
                .quiz
                .as_ref()
                .map(|quiz| quiz.iter().map(QuizQuestionRecord::from).collect()),
        }
    }
}

/// One entry of the persisted collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    pub content: String,
    #[serde(default)]
    pub ai_outputs: AiOutputsRecord,
}

impl DocumentRecord {
    pub fn to_domain(self) -> PortResult<Document> {
        Ok(Document {
            id: self.id,
            name: self.name,
            created_at: self.timestamp,
            word_count: self.word_count,
            content: self.content,
            outputs: self.ai_outputs.to_domain()?,
        })
    }
}

impl From<&Document> for DocumentRecord {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
            timestamp: document.created_at,
            word_count: document.word_count,
            content: document.content.clone(),
            ai_outputs: AiOutputsRecord::from(&document.outputs),
        }
    }
}

/// Decodes a persisted collection, failing as a whole on the first bad entry.
pub fn documents_from_records(records: Vec<DocumentRecord>) -> PortResult<Vec<Document>> {
    records.into_iter().map(DocumentRecord::to_domain).collect()
}

pub fn records_from_documents(documents: &[Document]) -> Vec<DocumentRecord> {
    documents.iter().map(DocumentRecord::from).collect()
}

//=========================================================================================
// Flow Contracts
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTextInput {
    pub document_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContentInput {
    pub document_content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SummarizeOutput {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyNotesOutput {
    pub study_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlashcardsOutput {
    pub flashcards: Vec<FlashcardRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizOutput {
    pub quiz: Vec<QuizQuestionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persisted_documents_use_camel_case_and_omit_empty_slots() {
        let record = DocumentRecord {
            id: Uuid::nil(),
            name: "paper.pdf".to_string(),
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            word_count: 3,
            content: "one two three".to_string(),
            ai_outputs: AiOutputsRecord {
                summary: Some("## Intro\nHi".to_string()),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["wordCount"], json!(3));
        assert_eq!(value["aiOutputs"], json!({ "summary": "## Intro\nHi" }));
    }

    #[test]
    fn records_without_outputs_still_load() {
        let raw = json!([{
            "id": "6f1c1b0e-3d5a-4a7e-9b2f-2f7d0c9a1e11",
            "name": "notes.txt",
            "timestamp": "2024-05-01T10:00:00Z",
            "wordCount": 2,
            "content": "hello world"
        }]);
        let records: Vec<DocumentRecord> = serde_json::from_value(raw).unwrap();
        let documents = documents_from_records(records).unwrap();
        assert_eq!(documents[0].name, "notes.txt");
        assert!(documents[0].outputs.summary.is_none());
    }

    #[test]
    fn flashcard_with_three_options_is_rejected() {
        let raw = json!({
            "question": "Q",
            "answer": "A",
            "explanation": "E",
            "options": ["a", "b", "c"],
            "correctOptionIndex": 0
        });
        let record: FlashcardRecord = serde_json::from_value(raw).unwrap();
        assert!(record.to_domain().is_err());
    }

    #[test]
    fn quiz_index_out_of_range_is_rejected() {
        let record = QuizQuestionRecord {
            question: "Q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: 4,
            explanation: "E".to_string(),
        };
        assert!(record.to_domain().is_err());
    }
}
