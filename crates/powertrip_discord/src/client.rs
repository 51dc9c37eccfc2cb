//! Serenity client lifecycle.

use crate::{DiscordConfig, GatewayState, MirrorHandler};
use powertrip_error::{ConfigError, MirrorError, MirrorErrorKind, PowertripResult};
use serenity::Client;
use serenity::all::{Http, ShardManager};
use std::sync::Arc;
use tracing::{info, instrument};

/// Gateway connection of the mirror bot.
///
/// # Example
///
/// ```rust,ignore
/// use powertrip_discord::{DiscordMirror, GatewayState, MirrorBot};
/// use std::sync::Arc;
///
/// let state = Arc::new(GatewayState::new());
/// let mut bot = MirrorBot::new(&config, state.clone()).await?;
/// let mirror = DiscordMirror::new(bot.http(), state, &config);
/// bot.start().await?;
/// ```
pub struct MirrorBot {
    client: Client,
}

impl MirrorBot {
    /// Build the serenity client. Nothing connects until [`MirrorBot::start`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is rejected locally.
    #[instrument(skip_all, fields(queue_channel = config.queue_channel()))]
    pub async fn new(config: &DiscordConfig, state: Arc<GatewayState>) -> PowertripResult<Self> {
        let intents = MirrorHandler::intents();
        info!(?intents, "Building Serenity client");

        let client = Client::builder(config.token(), intents)
            .event_handler(MirrorHandler::new(state))
            .await
            .map_err(|e| ConfigError::new(format!("Failed to build Discord client: {}", e)))?;

        Ok(Self { client })
    }

    /// Shared HTTP client for REST calls.
    pub fn http(&self) -> Arc<Http> {
        Arc::clone(&self.client.http)
    }

    /// Shard manager, used to close the gateway on shutdown.
    pub fn shard_manager(&self) -> Arc<ShardManager> {
        Arc::clone(&self.client.shard_manager)
    }

    /// Run the gateway until it closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway fails fatally (e.g. invalid token).
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> PowertripResult<()> {
        info!("Starting Discord gateway");
        self.client.start().await.map_err(|e| {
            MirrorError::new(MirrorErrorKind::Serenity(format!("Gateway error: {}", e)))
        })?;
        Ok(())
    }
}
