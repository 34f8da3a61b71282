//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// scaleplan - turn storefront screenshots into a reviewed growth plan
#[derive(Parser, Debug)]
#[command(name = "scaleplan")]
#[command(about = "Turn storefront screenshots into a reviewed growth plan and slide storyboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file layered over the bundled defaults
    #[arg(short, long, global = true, env = "SCALEPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Bind address, overriding settings
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overriding settings
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the workflow interactively for one brand
    Run(RunArgs),
}

/// Arguments for `scaleplan run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Featured brand
    #[arg(long)]
    pub brand: String,

    /// Product category
    #[arg(long)]
    pub category: String,

    /// Comparison brand
    #[arg(long)]
    pub competitor: Option<String>,

    /// Screenshot files (repeatable)
    #[arg(long = "image", short = 'i', required = true)]
    pub images: Vec<PathBuf>,

    /// Directory for the deliverables
    #[arg(long, short = 'o', default_value = "scaleplan-output")]
    pub out: PathBuf,

    /// Approve the first plan without prompting
    #[arg(long)]
    pub auto_approve: bool,
}
