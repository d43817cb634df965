//! services/api/src/adapters/notes_llm.rs
//!
//! This module contains the adapter for the Note-Generating LLM.
//! It implements the `NotesGenerationService` port from the `core` crate.

use crate::adapters::structured::{complete_structured, OutputSchema};
use crate::wire::StudyNotesOutput;
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use serde_json::json;
use study_companion_core::ports::{NotesGenerationService, PortResult};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an AI assistant specializing in creating high-quality, structured study notes from academic texts.

Your task is to transform the provided document content into comprehensive study notes using Markdown. The notes should be easy to read, scan, and edit.

Instructions:
1.  Organize the notes by topic or document section. Use '##' for main topic headings (e.g., '## Key Concepts from the Introduction').
2.  Within each topic, use a combination of paragraphs for explanations and bulleted lists ('*') for key points.
3.  Use markdown blockquotes ('>') for important definitions or direct quotes. Prefix the blockquote with a 📘 emoji.
4.  Use bold ('**text**') to highlight key terminology.
5.  For critical insights or main ideas, create a callout by starting a line with a 🧠 emoji followed by the text in italics.
6.  DO NOT use triple backticks ('```') for code blocks unless there is actual source code in the document.

Return the Markdown notes in the `studyNotes` field."#;

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: "generate_study_notes",
        description: "The generated study notes in Markdown format.",
        schema: json!({
            "type": "object",
            "properties": {
                "studyNotes": {
                    "type": "string",
                    "description": "The generated study notes in Markdown format."
                }
            },
            "required": ["studyNotes"],
            "additionalProperties": false
        }),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `NotesGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiNotesAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiNotesAdapter {
    /// Creates a new `OpenAiNotesAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `NotesGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotesGenerationService for OpenAiNotesAdapter {
    /// Transforms the document into topic-grouped notes with key terms bolded.
    async fn generate_study_notes(&self, document_content: &str) -> PortResult<String> {
        let output: StudyNotesOutput = complete_structured(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            format!("Document Content: {}", document_content),
            output_schema(),
        )
        .await?;
        Ok(output.study_notes)
    }
}
