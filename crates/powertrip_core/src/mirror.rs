//! Mirror channel message types.

use crate::ItemId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Opaque handle to a message in the mirror channel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MessageHandle(u64);

impl MessageHandle {
    /// Raw platform id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A live mirror of one queue item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct MirrorMessage {
    /// Id read from the durable tag written at post time
    source_item_id: ItemId,
    /// Message handle
    handle: MessageHandle,
}

impl MirrorMessage {
    /// Create a new mirror record.
    pub fn new(source_item_id: ItemId, handle: MessageHandle) -> Self {
        Self {
            source_item_id,
            handle,
        }
    }
}

/// One message as listed from the mirror channel.
///
/// # Examples
///
/// ```
/// use powertrip_core::{ChannelMessage, ItemId, MessageHandle};
///
/// let mirror = ChannelMessage::new(MessageHandle::from(7), true, Some(ItemId::from("a1")));
/// assert!(mirror.as_mirror().is_some());
///
/// let notice = ChannelMessage::new(MessageHandle::from(8), true, None);
/// assert!(notice.is_notice());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChannelMessage {
    /// Message handle
    handle: MessageHandle,
    /// Authored by this process's bot user
    own: bool,
    /// Item tag, when the message carries one
    source_item_id: Option<ItemId>,
}

impl ChannelMessage {
    /// Create a new listed message.
    pub fn new(handle: MessageHandle, own: bool, source_item_id: Option<ItemId>) -> Self {
        Self {
            handle,
            own,
            source_item_id,
        }
    }

    /// The mirror this message represents, if it is an own tagged message.
    pub fn as_mirror(&self) -> Option<MirrorMessage> {
        match (&self.source_item_id, self.own) {
            (Some(id), true) => Some(MirrorMessage::new(id.clone(), self.handle)),
            _ => None,
        }
    }

    /// Own message without an item tag (diagnostics and status notices).
    pub fn is_notice(&self) -> bool {
        self.own && self.source_item_id.is_none()
    }
}

/// Result of a delete call. Deleting a missing message is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DeleteOutcome {
    /// The message existed and was removed
    Deleted,
    /// The message was already gone
    AlreadyGone,
}

/// Bot presence shown in the mirror platform.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Presence {
    /// Healthy, watching the named activity
    #[display("watching {}", _0)]
    Watching(String),
    /// Stream paused after a failure
    #[display("degraded")]
    Degraded,
}

impl Presence {
    /// The presence shown while the stream runs.
    pub fn watching_reddit() -> Self {
        Presence::Watching("reddit.".to_string())
    }
}
