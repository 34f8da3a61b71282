//! Request and response types for completion calls.

use crate::{Message, Output};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Generic completion request.
///
/// Fields left unset fall back to the driver's defaults.
///
/// # Examples
///
/// ```
/// use scaleplan_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello")])
///     .max_tokens(4000)
///     .temperature(0.2)
///     .json_response(true)
///     .build()
///     .unwrap();
/// assert_eq!(*request.max_tokens(), Some(4000));
/// assert!(*request.json_response());
/// ```
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(default)]
pub struct GenerateRequest {
    /// Multi-turn conversation messages
    messages: Vec<Message>,
    /// Maximum tokens to generate
    #[builder(setter(strip_option))]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(setter(strip_option))]
    temperature: Option<f32>,
    /// Model override
    #[builder(setter(into, strip_option))]
    model: Option<String>,
    /// Ask for a single JSON object as the completion
    json_response: bool,
}

impl GenerateRequest {
    /// Creates a new builder for `GenerateRequest`.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Completion response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct GenerateResponse {
    /// Generated outputs
    outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Creates a response from its outputs.
    pub fn new(outputs: Vec<Output>) -> Self {
        Self { outputs }
    }

    /// Creates a response holding a single text output.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Output::Text(text.into())])
    }

    /// Joins every output into one string, JSON outputs rendered compactly.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .map(|output| match output {
                Output::Text(text) => text.clone(),
                Output::Json(value) => value.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
