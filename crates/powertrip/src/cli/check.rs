//! The `check-config` command.

use powertrip::PowertripSettings;
use powertrip_error::PowertripResult;
use tracing::info;

/// Convert every section the way `run` would and log the result.
pub fn check_config(settings: &PowertripSettings) -> PowertripResult<()> {
    let discord = settings.discord_config()?;
    let reddit = settings.reddit_config()?;
    let stream = settings.stream_config()?;
    let dispatcher = settings.dispatcher_config()?;

    info!(?discord, "Discord settings");
    info!(?reddit, "Reddit settings");
    info!(?stream, "Stream settings");
    info!(capabilities = ?dispatcher.capabilities(), "Action settings");
    info!("Configuration is valid");
    Ok(())
}
