//! Timing and behaviour settings for the stream and the dispatcher.

use derive_builder::Builder;
use derive_getters::Getters;
use powertrip_core::ActionCapabilities;
use std::time::Duration;

/// Timing of the reconciliation stream.
///
/// # Examples
///
/// ```
/// use powertrip_queue::StreamConfig;
/// use std::time::Duration;
///
/// let config = StreamConfig::builder()
///     .tick_interval(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(*config.tick_interval(), Duration::from_secs(10));
/// assert_eq!(*config.cooldown(), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
#[builder(default)]
pub struct StreamConfig {
    /// Delay between the end of one tick and the start of the next
    tick_interval: Duration,
    /// Wait after a transient failure before resuming
    cooldown: Duration,
    /// Upper bound on every collaborator call
    call_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(300),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl StreamConfig {
    /// Creates a new builder for `StreamConfig`.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }
}

/// Behaviour of the action dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
#[builder(default)]
pub struct DispatcherConfig {
    /// Which actions each item kind offers
    capabilities: ActionCapabilities,
    /// Attach a linked excerpt of the item to ban messages
    ban_message_excerpt: bool,
    /// Send the removal reason's message to the author
    send_removal_messages: bool,
    /// Pause between a successful action and deleting the mirror
    settle_delay: Duration,
    /// How many completed claims to remember
    completed_claims: usize,
    /// Upper bound on every collaborator call
    call_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            capabilities: ActionCapabilities::default(),
            ban_message_excerpt: true,
            send_removal_messages: true,
            settle_delay: Duration::from_millis(500),
            completed_claims: 4096,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl DispatcherConfig {
    /// Creates a new builder for `DispatcherConfig`.
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }
}
