//! HTTP client for OpenAI-compatible chat completions.

use crate::openai::ApiErrorBody;
use crate::{ChatCompletionRequest, ChatCompletionResponse, ClientConfig, conversion};
use async_trait::async_trait;
use scaleplan_core::{GenerateRequest, GenerateResponse};
use scaleplan_error::{ModelsError, ModelsErrorKind, ModelsResult, ScaleplanResult};
use scaleplan_interface::CompletionDriver;
use tracing::{debug, error, instrument};

/// Client for a chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url(), model = %config.model()))]
    pub fn new(config: ClientConfig) -> ModelsResult<Self> {
        debug!("Creating completion client");
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(*timeout);
        }
        let client = builder.build().map_err(|e| {
            ModelsError::new(ModelsErrorKind::Http(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })?;
        Ok(Self { config, client })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a chat completion request.
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> ModelsResult<ChatCompletionResponse> {
        let url = self.config.endpoint();
        debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Request failed");
                ModelsError::new(ModelsErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .ok()
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            error!(status = %status, message = %message, "Service returned error");
            return Err(ModelsError::new(ModelsErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse response");
            ModelsError::new(ModelsErrorKind::ResponseParsing(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        if let Some(usage) = result.usage() {
            debug!(
                prompt_tokens = usage.prompt_tokens(),
                completion_tokens = usage.completion_tokens(),
                "Chat completion successful"
            );
        }
        Ok(result)
    }
}

#[async_trait]
impl CompletionDriver for OpenAiClient {
    #[instrument(skip(self, req), fields(model = %self.config.model()))]
    async fn generate(&self, req: &GenerateRequest) -> ScaleplanResult<GenerateResponse> {
        let chat_request = conversion::to_chat_request(req, self.config.model())?;
        let response = self.chat_completion(&chat_request).await?;
        Ok(conversion::from_chat_response(response))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}
