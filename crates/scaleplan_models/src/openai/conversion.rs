//! Conversion between scaleplan core types and chat-completions wire types.

use crate::{
    ChatCompletionRequest, ChatCompletionResponse, ChatContent, ChatMessage, ContentPart,
    ImageUrl, ResponseFormat,
};
use scaleplan_core::{GenerateRequest, GenerateResponse, Input, MediaSource, Message, Output};
use scaleplan_error::{ModelsError, ModelsErrorKind, ModelsResult};
use tracing::warn;

/// Resolution requested for every image part.
pub const IMAGE_DETAIL: &str = "high";

/// Convert a [`GenerateRequest`] into a chat-completions request body.
///
/// The request's model override wins over `default_model`.
#[tracing::instrument(skip(request), fields(messages = request.messages().len()))]
pub fn to_chat_request(
    request: &GenerateRequest,
    default_model: &str,
) -> ModelsResult<ChatCompletionRequest> {
    let messages: Vec<ChatMessage> = request.messages().iter().map(to_chat_message).collect();

    let model = request
        .model()
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    let response_format = (*request.json_response()).then(ResponseFormat::json_object);

    ChatCompletionRequest::builder()
        .model(model)
        .messages(messages)
        .max_tokens(*request.max_tokens())
        .temperature(*request.temperature())
        .response_format(response_format)
        .build()
        .map_err(|e| {
            ModelsError::new(ModelsErrorKind::Builder(format!(
                "Failed to build request: {}",
                e
            )))
        })
}

/// Convert a core message, keeping plain string content unless images are attached.
pub fn to_chat_message(message: &Message) -> ChatMessage {
    let role = message.role().as_str();

    if !message.has_images() {
        return ChatMessage::new(role, ChatContent::Text(message.text()));
    }

    let parts = message
        .content()
        .iter()
        .map(|input| match input {
            Input::Text(text) => ContentPart::Text { text: text.clone() },
            Input::Image { mime, source } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_url(mime.as_deref(), source),
                    detail: Some(IMAGE_DETAIL.to_string()),
                },
            },
        })
        .collect();

    ChatMessage::new(role, ChatContent::Parts(parts))
}

fn image_url(mime: Option<&str>, source: &MediaSource) -> String {
    match source {
        MediaSource::Url(url) => url.clone(),
        MediaSource::Base64(payload) => format!(
            "data:{};base64,{}",
            mime.unwrap_or("image/png"),
            payload
        ),
    }
}

/// Convert a chat-completions response into a [`GenerateResponse`].
///
/// A response without choices, or whose first choice has no content,
/// yields a response with no outputs.
#[tracing::instrument(skip(response))]
pub fn from_chat_response(response: ChatCompletionResponse) -> GenerateResponse {
    let Some(choice) = response.choices().first() else {
        warn!("Completion response contained no choices");
        return GenerateResponse::default();
    };

    if choice.finish_reason().as_deref() == Some("length") {
        warn!("Completion was truncated at the token limit");
    }

    match choice.message().content() {
        Some(text) if !text.is_empty() => GenerateResponse::new(vec![Output::Text(text.clone())]),
        _ => GenerateResponse::default(),
    }
}
