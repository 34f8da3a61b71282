//! Client connection settings.

use derive_getters::Getters;
use scaleplan_core::ProviderSettings;
use scaleplan_error::{ModelsError, ModelsErrorKind, ModelsResult};
use std::time::Duration;
use tracing::{debug, instrument};

/// Connection settings for [`crate::OpenAiClient`].
#[derive(Clone, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    /// Base URL without the `/chat/completions` suffix
    base_url: String,
    /// Default model name
    model: String,
    /// Bearer token
    api_key: String,
    /// Per-request timeout
    #[builder(default)]
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Builds a config from provider settings, reading the API key from the
    /// environment variable the settings name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelsErrorKind::MissingApiKey`] if the variable is unset or blank.
    #[instrument(skip(settings), fields(base_url = %settings.base_url, model = %settings.model))]
    pub fn from_settings(settings: &ProviderSettings) -> ModelsResult<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ModelsError::new(ModelsErrorKind::MissingApiKey(settings.api_key_env.clone()))
            })?;

        debug!(api_key_env = %settings.api_key_env, "Resolved API key");

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            timeout: settings.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Full chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
