//! CLI interface for squeeze-watch
//!
//! Provides subcommands for:
//! - `run`: Start the monitoring loop
//! - `probe`: One-shot fetch of every configured symbol
//! - `status`: Show current state
//! - `config`: Show configuration

mod probe;
mod run;

pub use probe::ProbeArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "squeeze-watch")]
#[command(about = "Short-squeeze monitor for crypto perpetual futures")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring loop
    Run(RunArgs),
    /// Fetch each configured symbol once and print the result
    Probe(ProbeArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}
