//! Core data types for the PowerTrip moderation queue mirror.
//!
//! Everything here is platform neutral: queue items as read from the source
//! queue, handles to mirrored messages, moderation requests, and the
//! interactive controls attached to a mirror.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capabilities;
mod controls;
mod item;
mod mirror;
mod moderation;

pub use capabilities::{
    ActionCapabilities, ActionCapabilitiesBuilder, KindTag, MAX_BAN_DURATIONS,
};
pub use controls::{
    Action, ActionId, Button, ButtonStyle, Control, ControlSet, MAX_CONTROLS_PER_ROW,
    MAX_LABEL_LEN, MAX_ROWS, MAX_SELECT_OPTIONS, SelectMenu, SelectOption,
};
pub use item::{
    ItemId, ItemKind, QueueItem, QueueItemBuilder, QueueItemBuilderError, ReportSignal,
    ReporterClass,
};
pub use mirror::{ChannelMessage, DeleteOutcome, MessageHandle, MirrorMessage, Presence};
pub use moderation::{
    BanDuration, BanRequest, BanRequestBuilder, BanRequestBuilderError, RemovalMessage,
    RemovalReason, RemoveOptions,
};
