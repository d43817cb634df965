//! services/api/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter for the quiz-building LLM.
//! It implements the `QuizGenerationService` port from the `core` crate.

use crate::adapters::structured::{complete_structured, OutputSchema};
use crate::wire::{QuizOutput, QuizQuestionRecord};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use serde_json::json;
use study_companion_core::domain::QuizQuestion;
use study_companion_core::ports::{PortResult, QuizGenerationService};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert educator creating a multiple-choice quiz from a document.

Generate a 10-question quiz based on the document. Each question should have 4 options, with one correct answer and three plausible distractors. Include an explanation for the correct answer.

Output the quiz in the following JSON format:
{
  "quiz": [
    {
      "question": "Question 1",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswerIndex": 0,
      "explanation": "Explanation of the correct answer."
    }
  ]
}"#;

fn output_schema() -> OutputSchema {
    OutputSchema {
        name: "build_ai_quiz",
        description: "A list of quiz questions, options, and correct answers.",
        schema: json!({
            "type": "object",
            "properties": {
                "quiz": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": { "type": "string", "description": "The quiz question." },
                            "options": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "The four multiple-choice options."
                            },
                            "correctAnswerIndex": {
                                "type": "integer",
                                "description": "The index of the correct answer in the options array."
                            },
                            "explanation": {
                                "type": "string",
                                "description": "Explanation of the correct answer."
                            }
                        },
                        "required": ["question", "options", "correctAnswerIndex", "explanation"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["quiz"],
            "additionalProperties": false
        }),
    }
}

/// Validates every question as strictly as flashcards are validated.
pub fn quiz_from_output(output: QuizOutput) -> PortResult<Vec<QuizQuestion>> {
    output
        .quiz
        .into_iter()
        .map(QuizQuestionRecord::to_domain)
        .collect()
}

#[derive(Clone)]
pub struct OpenAiQuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQuizAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl QuizGenerationService for OpenAiQuizAdapter {
    async fn build_quiz(&self, document_text: &str) -> PortResult<Vec<QuizQuestion>> {
        let output: QuizOutput = complete_structured(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            format!("Document:\n{}", document_text),
            output_schema(),
        )
        .await?;
        quiz_from_output(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::structured::decode_structured;

    #[test]
    fn empty_quiz_decodes_to_no_questions() {
        let output: QuizOutput = decode_structured("quiz", r#"{"quiz":[]}"#).unwrap();
        assert!(quiz_from_output(output).unwrap().is_empty());
    }

    #[test]
    fn question_with_five_options_is_rejected() {
        let reply = r#"{"quiz":[{"question":"Q","options":["a","b","c","d","e"],"correctAnswerIndex":0,"explanation":"E"}]}"#;
        let output: QuizOutput = decode_structured("quiz", reply).unwrap();
        assert!(quiz_from_output(output).is_err());
    }

    #[test]
    fn valid_question_keeps_its_answer() {
        let reply = r#"{"quiz":[{"question":"Capital of France?","options":["Rome","Paris","Oslo","Bern"],"correctAnswerIndex":1,"explanation":"Paris is the capital."}]}"#;
        let output: QuizOutput = decode_structured("quiz", reply).unwrap();
        let quiz = quiz_from_output(output).unwrap();
        assert_eq!(quiz[0].correct_text(), "Paris");
    }
}
