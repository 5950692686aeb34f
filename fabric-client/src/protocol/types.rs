//! Wire types for the Fabric API
//!
//! This module contains the data structures exchanged with a Fabric server.
//! Field names are renamed to match the server's JSON contract exactly, so
//! these types can be serialized and deserialized without any mapping layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reusable prompt pattern stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pattern {
    /// Name of the pattern.
    pub name: String,

    /// Description of the pattern's purpose.
    #[serde(default)]
    pub description: String,

    /// The actual prompt or template string.
    #[serde(default)]
    pub pattern: String,
}

/// A named context file with its content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    /// Name of the context.
    pub name: String,

    /// The text or data stored in the context.
    #[serde(default)]
    pub content: String,
}

/// One message within a stored chat session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionMessage {
    /// The sender's role (e.g. `user`, `assistant`).
    pub role: String,

    /// The message text.
    pub content: String,
}

/// A stored chat session with its message history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Name of the session.
    pub name: String,

    /// Messages accumulated in the session.
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

/// A named strategy with its associated pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Strategy {
    /// Name of the strategy.
    pub name: String,

    /// Description of the strategy's purpose.
    #[serde(default)]
    pub description: String,

    /// The pattern associated with the strategy.
    #[serde(default)]
    pub pattern: String,
}

/// Server-side configuration: API keys for the LLM vendors Fabric can route to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Anthropic API key.
    #[serde(default)]
    pub anthropic: String,

    /// DeepSeek API key.
    #[serde(default)]
    pub deepseek: String,

    /// Gemini API key.
    #[serde(default)]
    pub gemini: String,

    /// Grokai API key.
    #[serde(default)]
    pub grokai: String,

    /// Groq API key.
    #[serde(default)]
    pub groq: String,

    /// LMStudio API key.
    #[serde(default)]
    pub lmstudio: String,

    /// Mistral API key.
    #[serde(default)]
    pub mistral: String,

    /// Ollama API key.
    #[serde(default)]
    pub ollama: String,

    /// OpenAI API key.
    #[serde(default)]
    pub openai: String,

    /// OpenRouter API key.
    #[serde(default)]
    pub openrouter: String,

    /// Silicon API key.
    #[serde(default)]
    pub silicon: String,
}

/// The models the server can serve, grouped by vendor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailableModels {
    /// Flat list of model names.
    #[serde(default)]
    pub models: Vec<String>,

    /// Vendor name to the models it provides.
    #[serde(default)]
    pub vendors: HashMap<String, Vec<String>>,
}

/// One prompt within a chat request.
///
/// The optional names select server-side resources; an empty string means
/// "none", matching the server's contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    /// The input provided by the user.
    #[serde(default)]
    pub user_input: String,

    /// Name of the LLM vendor (e.g. OpenAI, Anthropic).
    #[serde(default)]
    pub vendor: String,

    /// Name of the model to use.
    #[serde(default)]
    pub model: String,

    /// Name of the context to apply, if any.
    #[serde(default)]
    pub context_name: String,

    /// Name of the pattern to apply, if any.
    #[serde(default)]
    pub pattern_name: String,

    /// Name of the strategy to apply, if any.
    #[serde(default)]
    pub strategy_name: String,
}

/// Sampling and generation options for a chat request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    /// Name of the model to use for the chat.
    #[serde(default)]
    pub model: String,

    /// Controls the randomness of the model's responses.
    #[serde(default)]
    pub temperature: f64,

    /// Nucleus sampling parameter for controlling diversity.
    #[serde(default)]
    pub top_p: f64,

    /// Discourages repetition of tokens already present in the conversation.
    #[serde(default)]
    pub presence_penalty: f64,

    /// Discourages repetition of tokens based on their frequency.
    #[serde(default)]
    pub frequency_penalty: f64,

    /// Return raw model output without processing.
    #[serde(default)]
    pub raw: bool,

    /// Random seed for reproducibility.
    #[serde(default)]
    pub seed: i64,

    /// Maximum context length for the model.
    #[serde(default)]
    pub model_context_length: i64,
}

/// A chat invocation sent to the `/chat` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The prompts to process, in order.
    #[serde(default)]
    pub prompts: Vec<PromptRequest>,

    /// Language tag for the chat (e.g. `en`).
    #[serde(default)]
    pub language: String,

    /// Options applied to the whole chat.
    #[serde(default)]
    pub chat_options: ChatOptions,
}

/// One decoded unit of a chat stream.
///
/// The wire form is `{"type": ..., "format": ..., "content": ...}`; the
/// variant carries the terminality of the message in the type itself:
/// [`StreamMessage::Complete`] is always the last message of a session, and a
/// locally synthesized [`StreamMessage::Error`] ends the session as well.
///
/// `format` is a free-form rendering hint (`markdown`, `mermaid`, `plain`)
/// and is only meaningful for content messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    /// A chunk of generated output.
    Content {
        /// Rendering hint for the chunk.
        #[serde(default)]
        format: String,
        /// The chunk text.
        #[serde(default)]
        content: String,
    },

    /// A failure reported in-band, either by the server or synthesized by the
    /// stream consumer when the stream itself breaks.
    Error {
        /// Rendering hint, `plain` for synthesized errors.
        #[serde(default)]
        format: String,
        /// Human-readable error description.
        #[serde(default)]
        content: String,
    },

    /// Marks the successful end of the chat; no messages follow it.
    Complete {
        /// Rendering hint, typically empty.
        #[serde(default)]
        format: String,
        /// Final payload, typically empty.
        #[serde(default)]
        content: String,
    },
}

impl StreamMessage {
    /// Synthesize a `plain` error message for a local stream failure.
    pub(crate) fn plain_error(content: String) -> Self {
        StreamMessage::Error {
            format: "plain".to_string(),
            content,
        }
    }

    /// Whether this message marks the successful end of the session.
    pub fn is_complete(&self) -> bool {
        matches!(self, StreamMessage::Complete { .. })
    }

    /// The message payload, whatever the variant.
    pub fn text(&self) -> &str {
        match self {
            StreamMessage::Content { content, .. }
            | StreamMessage::Error { content, .. }
            | StreamMessage::Complete { content, .. } => content,
        }
    }

    /// The rendering hint, whatever the variant.
    pub fn format(&self) -> &str {
        match self {
            StreamMessage::Content { format, .. }
            | StreamMessage::Error { format, .. }
            | StreamMessage::Complete { format, .. } => format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_message_deserializes_tagged_wire_form() {
        let message: StreamMessage =
            serde_json::from_str(r#"{"type":"content","format":"markdown","content":"hello"}"#)
                .unwrap();
        assert_eq!(
            message,
            StreamMessage::Content {
                format: "markdown".to_string(),
                content: "hello".to_string(),
            }
        );
        assert!(!message.is_complete());
        assert_eq!(message.text(), "hello");
        assert_eq!(message.format(), "markdown");
    }

    #[test]
    fn stream_message_tolerates_missing_fields() {
        let message: StreamMessage = serde_json::from_str(r#"{"type":"complete"}"#).unwrap();
        assert!(message.is_complete());
        assert_eq!(message.text(), "");
    }

    #[test]
    fn stream_message_rejects_unknown_type() {
        assert!(serde_json::from_str::<StreamMessage>(r#"{"type":"bogus"}"#).is_err());
    }

    #[test]
    fn chat_request_serializes_with_server_field_names() {
        let request = ChatRequest {
            prompts: vec![PromptRequest {
                user_input: "hi".to_string(),
                vendor: "OpenAI".to_string(),
                model: "gpt-4o".to_string(),
                pattern_name: "summarize".to_string(),
                ..Default::default()
            }],
            language: "en".to_string(),
            chat_options: ChatOptions {
                top_p: 0.9,
                model_context_length: 4096,
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompts"][0]["userInput"], "hi");
        assert_eq!(value["prompts"][0]["patternName"], "summarize");
        assert_eq!(value["prompts"][0]["contextName"], "");
        assert_eq!(value["chatOptions"]["topP"], 0.9);
        assert_eq!(value["chatOptions"]["modelContextLength"], 4096);
        assert_eq!(value["language"], "en");
    }
}
