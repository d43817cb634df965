//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the summarizing LLM.
//! It implements the `SummaryGenerationService` port from the `core` crate.

use crate::adapters::structured::{complete_structured, OutputSchema};
use crate::wire::SummarizeOutput;
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use serde_json::json;
use study_companion_core::ports::{PortResult, SummaryGenerationService};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert academic summarizer. Your task is to create a detailed and well-structured summary of the provided document.

Instructions:
1.  Identify the main sections of the document (e.g., Abstract, Introduction, Methodology, Results, Discussion, Conclusion).
2.  For each section, provide a concise summary that includes a mix of paragraphs for explanation and bullet points for key details.
3.  Use Markdown for formatting. Use '## ' for main section titles. Use bold ('**text**') for important terms.
4.  Use relevant emojis to introduce sections, for example: 📜 **Abstract**, 🎯 **Introduction**, 🔬 **Methodology**, 📈 **Results**, 💬 **Discussion**, and 🏁 **Conclusion**.
5.  If a section is not present in the document, do not include it in the summary.

Return the Markdown summary in the `summary` field."#;

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: "summarize_document",
        description: "A concise summary of the document in Markdown format.",
        schema: json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "A concise summary of the document in Markdown format."
                }
            },
            "required": ["summary"],
            "additionalProperties": false
        }),
    }
}

/// An adapter that implements `SummaryGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl SummaryGenerationService for OpenAiSummaryAdapter {
    async fn summarize(&self, document_text: &str) -> PortResult<String> {
        let output: SummarizeOutput = complete_structured(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            format!("Document Text:\n{}\n\nSummary:", document_text),
            output_schema(),
        )
        .await?;
        Ok(output.summary)
    }
}
