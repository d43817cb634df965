//! services/api/src/adapters/structured.rs
//!
//! The chat-completion call shared by every generation flow: a fixed system
//! prompt, the document as the user turn, and a strict JSON-schema response
//! format that the reply is deserialized against.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use study_companion_core::ports::{PortError, PortResult};
use tracing::{debug, warn};

/// The shape a flow expects back from the model.
pub struct OutputSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

/// Sends one chat completion and decodes the reply as `T`.
pub async fn complete_structured<T: DeserializeOwned>(
    client: &Client<OpenAIConfig>,
    model: &str,
    system_prompt: &str,
    user_prompt: String,
    output: OutputSchema,
) -> PortResult<T> {
    let messages = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
    ];

    let name = output.name;
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .n(1)
        .response_format(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name: output.name.to_string(),
                description: Some(output.description.to_string()),
                schema: Some(output.schema),
                strict: Some(true),
            },
        })
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

    debug!("Requesting '{}' from model {}.", name, model);
    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            PortError::InvalidResponse(format!("'{}' response contained no text content.", name))
        })?;

    decode_structured(name, &content)
}

/// Parses the model's JSON reply into the flow's output type.
pub fn decode_structured<T: DeserializeOwned>(name: &str, content: &str) -> PortResult<T> {
    serde_json::from_str(content).map_err(|e| {
        warn!("'{}' response did not match its schema: {}", name, e);
        PortError::InvalidResponse(format!("'{}' response did not match its schema: {}", name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SummarizeOutput;

    #[test]
    fn decodes_matching_json() {
        let output: SummarizeOutput =
            decode_structured("summary", r###"{"summary":"## Intro\nHello"}"###).unwrap();
        assert_eq!(output.summary, "## Intro\nHello");
    }

    #[test]
    fn mismatched_json_is_an_invalid_response() {
        let err = decode_structured::<SummarizeOutput>("summary", r#"{"text":"x"}"#).unwrap_err();
        assert!(matches!(err, PortError::InvalidResponse(_)));

        let err = decode_structured::<SummarizeOutput>("summary", "not json").unwrap_err();
        assert!(matches!(err, PortError::InvalidResponse(_)));
    }
}
