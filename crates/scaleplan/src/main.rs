//! scaleplan command-line binary.
//!
//! - `serve` runs the HTTP API
//! - `run` walks one brand through the workflow in the terminal

use anyhow::Context;
use clap::Parser;
use scaleplan::{Settings, init_logging};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use cli::{Cli, Commands, run_wizard, serve_api};

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut settings =
        Settings::load_from(cli.config.as_deref()).context("Failed to load settings")?;
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }
    init_logging(&settings.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Serve { host, port } => serve_api(settings, host, port).await?,
        Commands::Run(args) => run_wizard(&settings, args).await?,
    }

    Ok(())
}
