//! Command-line interface module.

mod commands;
mod run;
mod serve;

pub use commands::{Cli, Commands, RunArgs};
pub use run::run_wizard;
pub use serve::serve_api;
