//! Discord mirror channel for PowerTrip.
//!
//! - [`MirrorBot`] owns the serenity client and gateway connection
//! - [`MirrorHandler`] publishes readiness into a [`GatewayState`] and
//!   forwards `pt:` component clicks to the attached
//!   [`InteractionSink`](powertrip_interface::InteractionSink)
//! - [`DiscordMirror`] implements
//!   [`MirrorChannel`](powertrip_interface::MirrorChannel) over the REST API
//! - [`MirrorEmbed`] and [`action_rows`] render items and controls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod gateway;
mod handler;
mod mirror;
mod render;

pub use client::MirrorBot;
pub use config::{DiscordConfig, DiscordConfigBuilder};
pub use gateway::{GatewaySession, GatewayState};
pub use handler::MirrorHandler;
pub use mirror::DiscordMirror;
pub use render::{
    EXCERPT_LEN, EmbedField, MirrorEmbed, QUEUE_COLOR, REPORTED_COLOR, action_rows,
};
