//! Logging setup shared by the server and the command-line binary.

use crate::LoggingSettings;
use scaleplan_error::{ConfigError, ScaleplanResult};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> ScaleplanResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| {
            ConfigError::new(format!("Invalid log level '{}': {}", settings.level, e))
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if settings.json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| ConfigError::new(format!("Failed to initialize logging: {}", e)))?;
    tracing::debug!(level = %settings.level, json = settings.json, "Logging initialized");
    Ok(())
}
