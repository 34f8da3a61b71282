//! Wire types for the chat-completions protocol.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ChatCompletionRequest {
    /// Model identifier
    model: String,
    /// Conversation messages
    messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 - 2.0)
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Forces a JSON object completion when set
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Creates a new builder for `ChatCompletionRequest`.
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::default()
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,
    /// Message content
    content: ChatContent,
}

impl ChatMessage {
    /// Create a new message.
    pub fn new(role: impl Into<String>, content: ChatContent) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }
}

/// Message content: a plain string, or typed parts when images are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    /// Text-only content
    Text(String),
    /// Mixed text and image parts
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text part
    Text {
        /// The text
        text: String,
    },
    /// Image part
    ImageUrl {
        /// Image location and requested detail
        image_url: ImageUrl,
    },
}

/// Image reference inside an image part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// `https://` or `data:` URL
    pub url: String,
    /// Resolution hint ("low", "high", "auto")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Requested completion format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Format type, e.g. "json_object"
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    /// Single JSON object completions.
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Chat-completions response body.
///
/// Every field is optional on the wire; compatible servers differ in what they send.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct ChatCompletionResponse {
    /// Unique identifier for the completion
    #[serde(default)]
    id: Option<String>,
    /// Model used for completion
    #[serde(default)]
    model: Option<String>,
    /// Generated completions
    #[serde(default)]
    choices: Vec<Choice>,
    /// Token usage statistics
    #[serde(default)]
    usage: Option<Usage>,
}

/// A completion choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Choice {
    /// Index of this choice
    #[serde(default)]
    index: u32,
    /// The generated message
    message: ChoiceMessage,
    /// Reason why generation finished
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Message in a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChoiceMessage {
    /// Role of the message (typically "assistant")
    #[serde(default)]
    role: Option<String>,
    /// Generated content
    #[serde(default)]
    content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    prompt_tokens: u32,
    /// Tokens in the completion
    #[serde(default)]
    completion_tokens: u32,
    /// Total tokens used
    #[serde(default)]
    total_tokens: u32,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub(crate) message: String,
}
