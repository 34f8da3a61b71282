//! Wiring settings to a live completion client.

use scaleplan_core::Settings;
use scaleplan_error::ScaleplanResult;
use scaleplan_models::{ClientConfig, OpenAiClient};
use scaleplan_server::SharedDriver;
use scaleplan_workflow::{PromptTemplates, StageHandlers};
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds stage handlers around an [`OpenAiClient`] configured from `settings`.
///
/// # Errors
///
/// Returns an error if the API key variable named in the provider settings is
/// unset or the HTTP client cannot be built.
#[instrument(skip_all, fields(model = %settings.provider.model))]
pub fn build_handlers(settings: &Settings) -> ScaleplanResult<StageHandlers<SharedDriver>> {
    let config = ClientConfig::from_settings(&settings.provider)?;
    let client = OpenAiClient::new(config)?;
    info!(base_url = %settings.provider.base_url, "Completion client ready");

    Ok(StageHandlers::with_settings(
        Arc::new(client) as SharedDriver,
        PromptTemplates::default(),
        settings.stages,
    ))
}
