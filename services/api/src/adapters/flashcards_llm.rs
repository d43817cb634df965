//! services/api/src/adapters/flashcards_llm.rs
//!
//! This module contains the adapter for the flashcard-generating LLM.
//! It implements the `FlashcardGenerationService` port from the `core` crate.

use crate::adapters::structured::{complete_structured, OutputSchema};
use crate::wire::{FlashcardRecord, FlashcardsOutput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use serde_json::json;
use study_companion_core::domain::Flashcard;
use study_companion_core::ports::{FlashcardGenerationService, PortResult};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an AI assistant designed to generate interactive, multiple-choice flashcards from a document for studying.

Generate 10-15 flashcards from the provided document content. Each flashcard must be a self-contained learning unit.

For each flashcard, provide the following:
1.  'question': A clear question about a key concept from the document.
2.  'options': An array of exactly 4 strings for a multiple-choice question. One option must be the correct answer, and the other three must be plausible but incorrect distractors. The correct answer from 'options' should be a concise version of the main 'answer'.
3.  'correctOptionIndex': The 0-based index of the correct answer within the 'options' array.
4.  'answer': A more detailed, complete answer to the question. This is what will be shown on the back of the card for full understanding.
5.  'explanation': A brief explanation of why the answer is correct, to reinforce learning."#;

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: "create_revision_flashcards",
        description: "An array of interactive flashcards generated from the document.",
        schema: json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The question on the front of the flashcard."
                            },
                            "answer": {
                                "type": "string",
                                "description": "The detailed correct answer for the back of the card."
                            },
                            "explanation": {
                                "type": "string",
                                "description": "A brief explanation of why the answer is correct."
                            },
                            "options": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Exactly 4 multiple-choice options, one correct and three plausible distractors."
                            },
                            "correctOptionIndex": {
                                "type": "integer",
                                "description": "The 0-based index of the correct answer in the options array."
                            }
                        },
                        "required": ["question", "answer", "explanation", "options", "correctOptionIndex"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["flashcards"],
            "additionalProperties": false
        }),
    }
}

/// Validates every card; one malformed card fails the whole batch.
pub fn flashcards_from_output(output: FlashcardsOutput) -> PortResult<Vec<Flashcard>> {
    output
        .flashcards
        .into_iter()
        .map(FlashcardRecord::to_domain)
        .collect()
}

#[derive(Clone)]
pub struct OpenAiFlashcardsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiFlashcardsAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl FlashcardGenerationService for OpenAiFlashcardsAdapter {
    async fn create_flashcards(&self, document_content: &str) -> PortResult<Vec<Flashcard>> {
        let output: FlashcardsOutput = complete_structured(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            format!("Document Content: {}", document_content),
            output_schema(),
        )
        .await?;
        flashcards_from_output(output)
    }
}
