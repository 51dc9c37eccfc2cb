//! Collaborator traits.

use crate::ComponentEvent;
use async_trait::async_trait;
use powertrip_core::{
    BanRequest, ChannelMessage, ControlSet, DeleteOutcome, MessageHandle, Presence, QueueItem,
    RemovalMessage, RemovalReason, RemoveOptions,
};
use powertrip_error::PowertripResult;

/// The remote moderation queue and its moderation actions.
#[async_trait]
pub trait SourceQueue: Send + Sync {
    /// Current queue contents, newest first.
    async fn list_queue(&self) -> PowertripResult<Vec<QueueItem>>;

    /// Approve an item.
    async fn approve(&self, item: &QueueItem) -> PowertripResult<()>;

    /// Unlock an item.
    async fn unlock(&self, item: &QueueItem) -> PowertripResult<()>;

    /// Remove an item, optionally attaching a note and removal reason.
    async fn remove(&self, item: &QueueItem, options: &RemoveOptions) -> PowertripResult<()>;

    /// Send a private removal message to the item's author.
    async fn send_removal_message(
        &self,
        item: &QueueItem,
        message: &RemovalMessage,
    ) -> PowertripResult<()>;

    /// Ban an account from a subreddit.
    async fn ban_author(&self, request: &BanRequest) -> PowertripResult<()>;

    /// Removal reasons configured for a subreddit, in display order.
    async fn removal_reasons(&self, subreddit: &str) -> PowertripResult<Vec<RemovalReason>>;

    /// Platform name (e.g. "reddit").
    fn platform_name(&self) -> &'static str;
}

/// The channel holding one mirror per queue item.
#[async_trait]
pub trait MirrorChannel: Send + Sync {
    /// Block until the platform connection is usable.
    async fn wait_until_ready(&self) -> PowertripResult<()>;

    /// Verify the configured channel exists and can hold mirrors.
    ///
    /// Failure here is a configuration error.
    async fn resolve_channel(&self) -> PowertripResult<()>;

    /// Recent messages in the channel, newest first.
    async fn list_messages(&self) -> PowertripResult<Vec<ChannelMessage>>;

    /// Most messages [`MirrorChannel::list_messages`] returns. Anything older
    /// is invisible to reconciliation.
    fn listing_window(&self) -> usize {
        usize::MAX
    }

    /// Post a mirror tagged with the item id.
    async fn post_mirror(
        &self,
        item: &QueueItem,
        controls: &ControlSet,
    ) -> PowertripResult<MessageHandle>;

    /// Post an untagged notice.
    async fn post_notice(&self, text: &str) -> PowertripResult<MessageHandle>;

    /// Record an audit line. No-op when no audit destination is configured.
    async fn post_audit(&self, text: &str) -> PowertripResult<()>;

    /// Delete a message. A missing message is [`DeleteOutcome::AlreadyGone`].
    async fn delete_message(&self, handle: MessageHandle) -> PowertripResult<DeleteOutcome>;

    /// Replace the controls on a message.
    async fn edit_controls(
        &self,
        handle: MessageHandle,
        controls: &ControlSet,
    ) -> PowertripResult<()>;

    /// Delete every message in the channel, whoever wrote it. Returns how
    /// many were removed.
    async fn purge(&self) -> PowertripResult<usize>;

    /// Update the bot presence.
    async fn set_presence(&self, presence: Presence) -> PowertripResult<()>;

    /// Platform name (e.g. "discord").
    fn platform_name(&self) -> &'static str;
}

/// Receives control invocations from the mirror platform.
///
/// Handlers never fail: errors are rendered on the mirror itself.
#[async_trait]
pub trait InteractionSink: Send + Sync {
    /// Handle one invocation.
    async fn on_component(&self, event: ComponentEvent);
}
