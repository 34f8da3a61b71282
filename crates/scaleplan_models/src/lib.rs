//! Completion service integrations for scaleplan.
//!
//! Currently a single backend: any service speaking the OpenAI
//! chat-completions protocol, with image parts for vision models.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai;

pub use openai::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, ChatContent,
    ChatMessage, Choice, ChoiceMessage, ClientConfig, ClientConfigBuilder, ContentPart, ImageUrl,
    OpenAiClient, ResponseFormat, Usage, conversion,
};
