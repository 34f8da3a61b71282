//! `serve` command handler.

use anyhow::Context;
use scaleplan::{AppState, Settings, build_handlers, serve};
use tracing::info;

/// Serves the HTTP API until Ctrl+C.
pub async fn serve_api(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let handlers = build_handlers(&settings).context("Failed to create completion client")?;
    info!(model = %settings.provider.model, "Starting scaleplan server");
    serve(AppState::new(handlers), &settings.server).await?;
    Ok(())
}
