//! Discord connection settings.

use derive_builder::Builder;
use derive_getters::Getters;

/// Settings for [`DiscordMirror`](crate::DiscordMirror) and [`MirrorBot`](crate::MirrorBot).
#[derive(Clone, Builder, Getters)]
#[builder(setter(into))]
pub struct DiscordConfig {
    /// Bot token
    token: String,
    /// Channel holding the mirrors
    queue_channel: u64,
    /// Channel receiving audit lines
    #[builder(default)]
    log_channel: Option<u64>,
    /// Most recent messages inspected per listing
    #[builder(default = "1000")]
    history_limit: usize,
}

impl DiscordConfig {
    /// Creates a new builder for `DiscordConfig`.
    pub fn builder() -> DiscordConfigBuilder {
        DiscordConfigBuilder::default()
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token_len", &self.token.len())
            .field("queue_channel", &self.queue_channel)
            .field("log_channel", &self.log_channel)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
