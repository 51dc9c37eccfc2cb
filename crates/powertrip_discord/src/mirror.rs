//! Discord implementation of the mirror channel.

use crate::render::{self, MirrorEmbed};
use crate::{DiscordConfig, GatewayState};
use async_trait::async_trait;
use powertrip_core::{
    ChannelMessage, ControlSet, DeleteOutcome, ItemId, MessageHandle, Presence, QueueItem,
};
use powertrip_error::{MirrorError, MirrorErrorKind, PowertripResult};
use powertrip_interface::MirrorChannel;
use serenity::all::{
    ActivityData, Channel, ChannelId, ChannelType, CreateMessage, EditMessage, GetMessages, Http,
    Message, MessageId, OnlineStatus, UserId,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Largest page the message history endpoint returns.
const PAGE_LIMIT: usize = 100;

/// Map a serenity failure, keeping the HTTP status when there is one.
fn mirror_error(operation: &'static str, error: serenity::Error) -> MirrorError {
    let status = match &error {
        serenity::Error::Http(http) => http.status_code().map(|s| s.as_u16()),
        _ => None,
    };
    match status {
        Some(status_code) => MirrorError::new(MirrorErrorKind::Http {
            status_code,
            message: format!("{} failed: {}", operation, error),
        }),
        None => MirrorError::new(MirrorErrorKind::Serenity(format!(
            "{} failed: {}",
            operation, error
        ))),
    }
}

/// The queue channel and optional audit channel on Discord.
pub struct DiscordMirror {
    http: Arc<Http>,
    state: Arc<GatewayState>,
    queue_channel: ChannelId,
    log_channel: Option<ChannelId>,
    history_limit: usize,
}

impl DiscordMirror {
    /// Creates a new mirror over a shared HTTP client.
    pub fn new(http: Arc<Http>, state: Arc<GatewayState>, config: &DiscordConfig) -> Self {
        Self {
            http,
            state,
            queue_channel: ChannelId::new(*config.queue_channel()),
            log_channel: config.log_channel().map(ChannelId::new),
            history_limit: *config.history_limit(),
        }
    }

    fn classify(message: &Message, bot: UserId) -> ChannelMessage {
        let own = message.author.id == bot;
        let tag = if own {
            message
                .embeds
                .first()
                .and_then(|embed| embed.footer.as_ref())
                .map(|footer| footer.text.trim())
                .filter(|text| !text.is_empty())
                .map(ItemId::from)
        } else {
            None
        };
        ChannelMessage::new(MessageHandle::from(message.id.get()), own, tag)
    }

    async fn check_text_channel(&self, channel: ChannelId) -> PowertripResult<()> {
        match channel.to_channel(&*self.http).await {
            Ok(Channel::Guild(guild_channel))
                if matches!(guild_channel.kind, ChannelType::Text | ChannelType::News) =>
            {
                debug!(channel = %channel, name = %guild_channel.name, "Channel resolved");
                Ok(())
            }
            Ok(_) => Err(MirrorError::new(MirrorErrorKind::ChannelUnusable(format!(
                "{} is not a guild text channel",
                channel
            )))
            .into()),
            Err(e) => {
                let mapped = mirror_error("resolve_channel", e);
                let kind = match &mapped.kind {
                    MirrorErrorKind::Http {
                        status_code: 404, ..
                    } => MirrorErrorKind::ChannelNotFound(channel.get()),
                    MirrorErrorKind::Http {
                        status_code: 403, ..
                    } => MirrorErrorKind::ChannelUnusable(format!(
                        "missing access to channel {}",
                        channel
                    )),
                    _ => return Err(mapped.into()),
                };
                error!(channel = %channel, error = %kind, "Configured channel is unusable");
                Err(MirrorError::new(kind).into())
            }
        }
    }

    async fn delete(&self, handle: MessageHandle) -> PowertripResult<DeleteOutcome> {
        match self
            .queue_channel
            .delete_message(&*self.http, MessageId::new(handle.get()))
            .await
        {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) => {
                let mapped = mirror_error("delete_message", e);
                if mapped.kind.is_not_found() {
                    debug!(handle = %handle, "Message already gone");
                    Ok(DeleteOutcome::AlreadyGone)
                } else {
                    Err(mapped.into())
                }
            }
        }
    }
}

#[async_trait]
impl MirrorChannel for DiscordMirror {
    async fn wait_until_ready(&self) -> PowertripResult<()> {
        self.state.wait_until_ready().await
    }

    #[instrument(skip(self), fields(channel = %self.queue_channel))]
    async fn resolve_channel(&self) -> PowertripResult<()> {
        self.check_text_channel(self.queue_channel).await?;
        if let Some(log_channel) = self.log_channel {
            self.check_text_channel(log_channel).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(channel = %self.queue_channel))]
    async fn list_messages(&self) -> PowertripResult<Vec<ChannelMessage>> {
        let bot = self.state.require_session()?.bot_user();
        let mut listed = Vec::new();
        let mut before: Option<MessageId> = None;

        while listed.len() < self.history_limit {
            let page_size = (self.history_limit - listed.len()).min(PAGE_LIMIT);
            let mut request = GetMessages::new().limit(page_size as u8);
            if let Some(before) = before {
                request = request.before(before);
            }
            let page = self
                .queue_channel
                .messages(&*self.http, request)
                .await
                .map_err(|e| mirror_error("list_messages", e))?;

            listed.extend(page.iter().map(|message| Self::classify(message, bot)));
            before = page.last().map(|message| message.id);
            if page.len() < page_size || before.is_none() {
                break;
            }
        }

        debug!(count = listed.len(), "Listed channel messages");
        Ok(listed)
    }

    fn listing_window(&self) -> usize {
        self.history_limit
    }

    #[instrument(skip(self, item, controls), fields(item_id = %item.id()))]
    async fn post_mirror(
        &self,
        item: &QueueItem,
        controls: &ControlSet,
    ) -> PowertripResult<MessageHandle> {
        let message = CreateMessage::new()
            .embed(MirrorEmbed::from_item(item).to_create_embed())
            .components(render::action_rows(controls));
        let posted = self
            .queue_channel
            .send_message(&*self.http, message)
            .await
            .map_err(|e| mirror_error("post_mirror", e))?;
        let handle = MessageHandle::from(posted.id.get());
        debug!(handle = %handle, "Posted mirror");
        Ok(handle)
    }

    #[instrument(skip(self, text))]
    async fn post_notice(&self, text: &str) -> PowertripResult<MessageHandle> {
        let posted = self
            .queue_channel
            .say(&*self.http, text)
            .await
            .map_err(|e| mirror_error("post_notice", e))?;
        Ok(MessageHandle::from(posted.id.get()))
    }

    async fn post_audit(&self, text: &str) -> PowertripResult<()> {
        let Some(log_channel) = self.log_channel else {
            return Ok(());
        };
        log_channel
            .say(&*self.http, text)
            .await
            .map_err(|e| mirror_error("post_audit", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(handle = %handle))]
    async fn delete_message(&self, handle: MessageHandle) -> PowertripResult<DeleteOutcome> {
        self.delete(handle).await
    }

    #[instrument(skip(self, controls), fields(handle = %handle))]
    async fn edit_controls(
        &self,
        handle: MessageHandle,
        controls: &ControlSet,
    ) -> PowertripResult<()> {
        self.queue_channel
            .edit_message(
                &*self.http,
                MessageId::new(handle.get()),
                EditMessage::new().components(render::action_rows(controls)),
            )
            .await
            .map_err(|e| mirror_error("edit_controls", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(channel = %self.queue_channel))]
    async fn purge(&self) -> PowertripResult<usize> {
        let mut removed = 0;
        for message in self.list_messages().await? {
            if self.delete(*message.handle()).await? == DeleteOutcome::Deleted {
                removed += 1;
            }
        }
        info!(removed, "Purged queue channel");
        Ok(removed)
    }

    async fn set_presence(&self, presence: Presence) -> PowertripResult<()> {
        let session = self.state.require_session()?;
        match &presence {
            Presence::Watching(name) => session
                .shard()
                .set_presence(Some(ActivityData::watching(name)), OnlineStatus::Online),
            Presence::Degraded => session.shard().set_presence(None, OnlineStatus::Idle),
        }
        debug!(presence = %presence, "Presence updated");
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "discord"
    }
}
