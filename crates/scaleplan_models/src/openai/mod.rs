//! OpenAI-compatible chat-completions backend.

mod client;
mod config;
pub mod conversion;
mod dto;

pub use client::OpenAiClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use dto::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, ChatContent,
    ChatMessage, Choice, ChoiceMessage, ContentPart, ImageUrl, ResponseFormat, Usage,
};
pub(crate) use dto::ApiErrorBody;
