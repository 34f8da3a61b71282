//! Layered application settings.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`scaleplan.toml` shipped with this crate)
//! 2. `~/.config/scaleplan/scaleplan.toml`
//! 3. `./scaleplan.toml`, or an explicit file passed to [`Settings::load_from`]
//! 4. Environment variables prefixed `SCALEPLAN_`, nested with `__`
//!    (e.g. `SCALEPLAN_PROVIDER__MODEL=gpt-4o-mini`)

use config::{Config, Environment, File, FileFormat};
use scaleplan_error::{ConfigError, ScaleplanError, ScaleplanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

const DEFAULT_SETTINGS: &str = include_str!("../scaleplan.toml");

/// Connection details for the OpenAI-compatible completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL, without the trailing `/chat/completions`
    pub base_url: String,
    /// Default model name
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout; unset means no client-side timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Generation parameters for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Generation parameters per workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSettings {
    /// Screenshot extraction
    pub extraction: StageOptions,
    /// Plan generation and refinement
    pub plan: StageOptions,
    /// Fact-check evaluation
    pub evaluation: StageOptions,
    /// Slide storyboard
    pub storyboard: StageOptions,
}

impl Default for StageSettings {
    /// Same values as the bundled `scaleplan.toml`.
    fn default() -> Self {
        Self {
            extraction: StageOptions {
                max_tokens: 4000,
                temperature: 0.2,
            },
            plan: StageOptions {
                max_tokens: 16000,
                temperature: 0.7,
            },
            evaluation: StageOptions {
                max_tokens: 8000,
                temperature: 0.5,
            },
            storyboard: StageOptions {
                max_tokens: 16000,
                temperature: 0.7,
            },
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Largest accepted request body, screenshots included
    pub max_body_bytes: usize,
    /// Sessions untouched for this long are dropped; 0 keeps them until deleted
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_session_idle_secs() -> u64 {
    3600
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Top-level scaleplan settings.
///
/// # Example
///
/// ```no_run
/// use scaleplan_core::Settings;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings::load()?;
/// println!("Using model {}", settings.provider.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Completion service
    pub provider: ProviderSettings,
    /// Per-stage generation parameters
    pub stages: StageSettings,
    /// HTTP server
    pub server: ServerSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from every layer, using `./scaleplan.toml` as the local file.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed, or if the merged
    /// settings fail [`Settings::validate`].
    #[instrument]
    pub fn load() -> ScaleplanResult<Self> {
        Self::load_from(None)
    }

    /// Loads settings, replacing `./scaleplan.toml` with `path` when given.
    ///
    /// An explicit path is required to exist.
    #[instrument(skip(path))]
    pub fn load_from(path: Option<&Path>) -> ScaleplanResult<Self> {
        debug!(path = ?path, "Loading settings: env > local file > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_settings = home.join(".config/scaleplan/scaleplan.toml");
            builder = builder.add_source(File::from(home_settings).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("scaleplan").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("SCALEPLAN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder.build())
    }

    /// Parses settings from TOML text layered over the bundled defaults.
    ///
    /// Environment variables are not consulted.
    pub fn from_toml_str(overrides: &str) -> ScaleplanResult<Self> {
        Self::finish(
            Config::builder()
                .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
                .add_source(File::from_str(overrides, FileFormat::Toml))
                .build(),
        )
    }

    /// Bundled defaults only.
    pub fn bundled() -> ScaleplanResult<Self> {
        Self::from_toml_str("")
    }

    fn finish(built: Result<Config, config::ConfigError>) -> ScaleplanResult<Self> {
        let settings: Self = built
            .map_err(|e| {
                ScaleplanError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ScaleplanError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges the completion service would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending key.
    pub fn validate(&self) -> ScaleplanResult<()> {
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::new("provider.model must not be empty").into());
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::new("provider.base_url must not be empty").into());
        }
        let stages = [
            ("extraction", &self.stages.extraction),
            ("plan", &self.stages.plan),
            ("evaluation", &self.stages.evaluation),
            ("storyboard", &self.stages.storyboard),
        ];
        for (name, options) in stages {
            if options.max_tokens == 0 {
                return Err(ConfigError::new(format!(
                    "stages.{}.max_tokens must be greater than zero",
                    name
                ))
                .into());
            }
            if !(0.0..=2.0).contains(&options.temperature) {
                return Err(ConfigError::new(format!(
                    "stages.{}.temperature must be between 0 and 2, got {}",
                    name, options.temperature
                ))
                .into());
            }
        }
        Ok(())
    }
}
