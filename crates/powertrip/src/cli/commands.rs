//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PowerTrip - mirror the Reddit moderation queue into a Discord channel
#[derive(Parser, Debug)]
#[command(name = "powertrip")]
#[command(about = "Mirror the Reddit moderation queue into a Discord channel", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (replaces ./powertrip.toml and the user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the mirror until interrupted
    Run,

    /// Load and validate the configuration, then exit
    CheckConfig,
}
