//! PowerTrip mirrors the Reddit moderation queue into a Discord channel.
//!
//! Each queued item becomes an embed with moderation controls. The
//! [`run_mirror`] entry point wires the Reddit client, the Discord client and
//! the queue stream together and runs until a fatal error or a shutdown
//! signal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod observability;
mod settings;

pub use app::{run_mirror, shutdown_signal};
pub use observability::init_tracing;
pub use settings::{
    ActionSettings, DiscordSettings, MAX_BAN_DAYS, PowertripSettings, RedditSettings,
    StreamSettings, parse_ban_durations,
};
