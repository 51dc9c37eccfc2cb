//! PowerTrip binary.
//!
//! - `run`: mirror the modqueue until Ctrl+C or SIGTERM
//! - `check-config`: validate the layered configuration and exit

use clap::Parser;
use powertrip::{PowertripSettings, init_tracing, run_mirror};
use tracing::{error, info};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_config};

    // Variables from .env feed both the PT_ and the legacy pt_ sources
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => error!(error = %e, "Failed to read environment file"),
    }

    let settings = PowertripSettings::load(cli.config.as_deref()).inspect_err(|e| {
        error!(error = %e, "Configuration rejected");
    })?;

    match cli.command {
        Commands::Run => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting PowerTrip");
            run_mirror(&settings).await.inspect_err(|e| {
                error!(error = %e, fatal = e.is_fatal(), "PowerTrip stopped with an error");
            })?;
        }

        Commands::CheckConfig => {
            check_config(&settings)?;
        }
    }

    Ok(())
}
