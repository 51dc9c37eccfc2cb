//! In-memory collaborators for exercising the queue crate.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use powertrip_core::{
    BanRequest, ChannelMessage, Control, ControlSet, DeleteOutcome, ItemId, ItemKind,
    MessageHandle, Presence, QueueItem, RemovalMessage, RemovalReason, RemoveOptions,
};
use powertrip_error::{MirrorError, MirrorErrorKind, PowertripResult, SourceError, SourceErrorKind};
use powertrip_interface::{ComponentEvent, MirrorChannel, SourceQueue};
use powertrip_queue::{Dispatcher, DispatcherConfig, QueueMetrics, Reconciler};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A comment queue item by `author`.
pub fn comment(id: &str, created: i64) -> QueueItem {
    QueueItem::builder()
        .id(id)
        .kind(ItemKind::Comment {
            body: format!("comment {id}"),
        })
        .subreddit("testsub")
        .author(Some("author".to_string()))
        .permalink(format!("/r/testsub/comments/p/t/{id}/"))
        .created_at(DateTime::from_timestamp(created, 0).unwrap())
        .build()
        .unwrap()
}

/// A submission queue item.
pub fn submission(id: &str, created: i64) -> QueueItem {
    QueueItem::builder()
        .id(id)
        .kind(ItemKind::Submission {
            title: format!("title {id}"),
            selftext: Some("text".to_string()),
            url: None,
            media_url: None,
        })
        .subreddit("testsub")
        .author(Some("poster".to_string()))
        .permalink(format!("/r/testsub/comments/{id}/t/"))
        .created_at(DateTime::from_timestamp(created, 0).unwrap())
        .build()
        .unwrap()
}

/// A locked comment.
pub fn locked_comment(id: &str, created: i64) -> QueueItem {
    QueueItem::builder()
        .id(id)
        .kind(ItemKind::Comment {
            body: format!("comment {id}"),
        })
        .subreddit("testsub")
        .author(Some("author".to_string()))
        .permalink(format!("/r/testsub/comments/p/t/{id}/"))
        .created_at(DateTime::from_timestamp(created, 0).unwrap())
        .locked(true)
        .build()
        .unwrap()
}

/// A comment whose author is gone.
pub fn authorless(id: &str, created: i64) -> QueueItem {
    QueueItem::builder()
        .id(id)
        .kind(ItemKind::Comment {
            body: "[deleted]".to_string(),
        })
        .subreddit("testsub")
        .permalink(format!("/r/testsub/comments/p/t/{id}/"))
        .created_at(DateTime::from_timestamp(created, 0).unwrap())
        .build()
        .unwrap()
}

/// Build a component event.
pub fn event(handle: MessageHandle, custom_id: &str, values: &[&str]) -> ComponentEvent {
    ComponentEvent::builder()
        .handle(handle)
        .custom_id(custom_id)
        .values(values.iter().map(|v| v.to_string()).collect::<Vec<_>>())
        .actor("modname")
        .build()
        .unwrap()
}

/// Poll `condition` on the (usually paused) clock until it holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..20_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("condition never held");
}

/// Source-side call recorded by [`FakeSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    /// approve(fullname)
    Approve(String),
    /// unlock(fullname)
    Unlock(String),
    /// remove(fullname, options)
    Remove(String, RemoveOptions),
    /// send_removal_message(fullname, message)
    RemovalMessage(String, RemovalMessage),
    /// ban_author(request)
    Ban(BanRequest),
    /// removal_reasons(subreddit)
    Reasons(String),
}

impl SourceCall {
    /// Whether the call changes source state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, SourceCall::Reasons(_))
    }
}

#[derive(Default)]
struct SourceState {
    queue: Vec<QueueItem>,
    calls: Vec<SourceCall>,
    failures: HashMap<&'static str, usize>,
    reasons: Vec<RemovalReason>,
    panic_next_list: bool,
    list_calls: usize,
}

/// In-memory moderation queue.
#[derive(Default)]
pub struct FakeSource {
    state: Mutex<SourceState>,
}

impl FakeSource {
    /// Empty queue.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the queue, given newest first as the source lists it.
    pub fn set_queue(&self, items: Vec<QueueItem>) {
        self.state.lock().queue = items;
    }

    /// Current queue ids.
    pub fn queue_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .queue
            .iter()
            .map(|item| item.id().to_string())
            .collect()
    }

    /// Removal reasons offered for every subreddit.
    pub fn set_reasons(&self, reasons: Vec<RemovalReason>) {
        self.state.lock().reasons = reasons;
    }

    /// Fail the next `times` calls of `operation` with an HTTP 500.
    pub fn fail(&self, operation: &'static str, times: usize) {
        self.state.lock().failures.insert(operation, times);
    }

    /// Panic inside the next `list_queue`.
    pub fn panic_next_list(&self) {
        self.state.lock().panic_next_list = true;
    }

    /// Every recorded call.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.state.lock().calls.clone()
    }

    /// Recorded calls that change source state.
    pub fn mutations(&self) -> Vec<SourceCall> {
        self.calls().into_iter().filter(SourceCall::is_mutation).collect()
    }

    /// Number of `list_queue` calls.
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    fn check(&self, operation: &'static str) -> PowertripResult<()> {
        let mut state = self.state.lock();
        match state.failures.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(SourceError::new(SourceErrorKind::Http {
                    status_code: 500,
                    message: format!("{operation} failed"),
                })
                .into())
            }
            _ => Ok(()),
        }
    }

    fn leave_queue(&self, item: &QueueItem) {
        self.state.lock().queue.retain(|queued| queued.id() != item.id());
    }

    fn record(&self, call: SourceCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl SourceQueue for FakeSource {
    async fn list_queue(&self) -> PowertripResult<Vec<QueueItem>> {
        let should_panic = {
            let mut state = self.state.lock();
            state.list_calls += 1;
            std::mem::take(&mut state.panic_next_list)
        };
        if should_panic {
            panic!("simulated listing panic");
        }
        self.check("list_queue")?;
        Ok(self.state.lock().queue.clone())
    }

    async fn approve(&self, item: &QueueItem) -> PowertripResult<()> {
        self.check("approve")?;
        self.record(SourceCall::Approve(item.fullname()));
        self.leave_queue(item);
        Ok(())
    }

    async fn unlock(&self, item: &QueueItem) -> PowertripResult<()> {
        self.check("unlock")?;
        self.record(SourceCall::Unlock(item.fullname()));
        Ok(())
    }

    async fn remove(&self, item: &QueueItem, options: &RemoveOptions) -> PowertripResult<()> {
        self.check("remove")?;
        self.record(SourceCall::Remove(item.fullname(), options.clone()));
        self.leave_queue(item);
        Ok(())
    }

    async fn send_removal_message(
        &self,
        item: &QueueItem,
        message: &RemovalMessage,
    ) -> PowertripResult<()> {
        self.check("send_removal_message")?;
        self.record(SourceCall::RemovalMessage(item.fullname(), message.clone()));
        Ok(())
    }

    async fn ban_author(&self, request: &BanRequest) -> PowertripResult<()> {
        self.check("ban_author")?;
        self.record(SourceCall::Ban(request.clone()));
        Ok(())
    }

    async fn removal_reasons(&self, subreddit: &str) -> PowertripResult<Vec<RemovalReason>> {
        self.check("removal_reasons")?;
        self.record(SourceCall::Reasons(subreddit.to_string()));
        Ok(self.state.lock().reasons.clone())
    }

    fn platform_name(&self) -> &'static str {
        "fake-source"
    }
}

/// One message held by [`FakeMirror`].
#[derive(Debug, Clone)]
pub struct FakeMessage {
    /// Handle
    pub handle: MessageHandle,
    /// Authored by the bot
    pub own: bool,
    /// Item tag
    pub tag: Option<ItemId>,
    /// Notice text
    pub text: Option<String>,
    /// Attached controls
    pub controls: ControlSet,
    /// Listed, but already deleted by the time a delete arrives
    pub ghost: bool,
}

struct MirrorState {
    messages: Vec<FakeMessage>,
    next_handle: u64,
    failures: HashMap<&'static str, usize>,
    channel_missing: bool,
    hang_list: bool,
    presence_log: Vec<Presence>,
    notice_log: Vec<String>,
    audit_log: Vec<String>,
    delete_log: Vec<MessageHandle>,
    post_count: usize,
    window: Option<usize>,
}

/// In-memory mirror channel. Messages are kept oldest first.
pub struct FakeMirror {
    state: Mutex<MirrorState>,
}

impl FakeMirror {
    /// Empty, resolvable channel.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MirrorState {
                messages: Vec::new(),
                next_handle: 100,
                failures: HashMap::new(),
                channel_missing: false,
                hang_list: false,
                presence_log: Vec::new(),
                notice_log: Vec::new(),
                audit_log: Vec::new(),
                delete_log: Vec::new(),
                post_count: 0,
                window: None,
            }),
        })
    }

    /// Make `resolve_channel` fail with a missing channel.
    pub fn remove_channel(&self) {
        self.state.lock().channel_missing = true;
    }

    /// Make `list_messages` never return.
    pub fn hang_listing(&self) {
        self.state.lock().hang_list = true;
    }

    /// Fail the next `times` calls of `operation` with an HTTP 500.
    pub fn fail(&self, operation: &'static str, times: usize) {
        self.state.lock().failures.insert(operation, times);
    }

    /// Only list the newest `window` messages, like a bounded history fetch.
    pub fn set_window(&self, window: usize) {
        self.state.lock().window = Some(window);
    }

    /// Seed a message authored by someone else.
    pub fn add_foreign(&self, tag: Option<&str>) -> MessageHandle {
        self.push(false, tag.map(ItemId::from), Some("foreign".to_string()), ControlSet::new())
    }

    /// Seed a mirror left over from an earlier run.
    pub fn add_mirror(&self, tag: &str) -> MessageHandle {
        self.push(true, Some(ItemId::from(tag)), None, ControlSet::new())
    }

    /// Seed a mirror that disappears when deleted, as if someone beat us to it.
    pub fn add_ghost(&self, tag: &str) -> MessageHandle {
        let handle = self.add_mirror(tag);
        if let Some(message) = self
            .state
            .lock()
            .messages
            .iter_mut()
            .find(|m| m.handle == handle)
        {
            message.ghost = true;
        }
        handle
    }

    /// Seed an own notice.
    pub fn add_notice(&self, text: &str) -> MessageHandle {
        self.push(true, None, Some(text.to_string()), ControlSet::new())
    }

    /// Delete a message behind the reconciler's back.
    pub fn delete_externally(&self, handle: MessageHandle) {
        self.state.lock().messages.retain(|m| m.handle != handle);
    }

    /// Tags of own mirrors in channel order (oldest first).
    pub fn tags(&self) -> Vec<String> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|m| m.own)
            .filter_map(|m| m.tag.as_ref().map(ItemId::to_string))
            .collect()
    }

    /// Handle of the own mirror tagged `tag`.
    pub fn handle_of(&self, tag: &str) -> Option<MessageHandle> {
        self.state
            .lock()
            .messages
            .iter()
            .find(|m| m.own && m.tag.as_ref().is_some_and(|t| t.as_str() == tag))
            .map(|m| m.handle)
    }

    /// Controls currently attached to a message.
    pub fn controls_of(&self, handle: MessageHandle) -> Option<ControlSet> {
        self.state
            .lock()
            .messages
            .iter()
            .find(|m| m.handle == handle)
            .map(|m| m.controls.clone())
    }

    /// Custom ids currently attached to a message.
    pub fn custom_ids_of(&self, handle: MessageHandle) -> Vec<String> {
        self.controls_of(handle)
            .map(|controls| {
                controls
                    .controls()
                    .map(|control| control.custom_id().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Label of the first button on a message.
    pub fn first_label(&self, handle: MessageHandle) -> Option<String> {
        let controls = self.controls_of(handle)?;
        controls.controls().find_map(|control| match control {
            Control::Button(button) => Some(button.label().clone()),
            Control::Select(_) => None,
        })
    }

    /// Own notices currently in the channel.
    pub fn notices(&self) -> Vec<String> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|m| m.own && m.tag.is_none())
            .filter_map(|m| m.text.clone())
            .collect()
    }

    /// Every notice ever posted.
    pub fn notice_log(&self) -> Vec<String> {
        self.state.lock().notice_log.clone()
    }

    /// Every presence ever set.
    pub fn presence_log(&self) -> Vec<Presence> {
        self.state.lock().presence_log.clone()
    }

    /// Every audit line.
    pub fn audit_log(&self) -> Vec<String> {
        self.state.lock().audit_log.clone()
    }

    /// Every handle passed to `delete_message`.
    pub fn delete_log(&self) -> Vec<MessageHandle> {
        self.state.lock().delete_log.clone()
    }

    /// Number of mirrors posted.
    pub fn post_count(&self) -> usize {
        self.state.lock().post_count
    }

    /// Total messages in the channel.
    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    fn push(
        &self,
        own: bool,
        tag: Option<ItemId>,
        text: Option<String>,
        controls: ControlSet,
    ) -> MessageHandle {
        let mut state = self.state.lock();
        let handle = MessageHandle::from(state.next_handle);
        state.next_handle += 1;
        state.messages.push(FakeMessage {
            handle,
            own,
            tag,
            text,
            controls,
            ghost: false,
        });
        handle
    }

    fn check(&self, operation: &'static str) -> PowertripResult<()> {
        let mut state = self.state.lock();
        match state.failures.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(MirrorError::new(MirrorErrorKind::Http {
                    status_code: 500,
                    message: format!("{operation} failed"),
                })
                .into())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MirrorChannel for FakeMirror {
    async fn wait_until_ready(&self) -> PowertripResult<()> {
        Ok(())
    }

    async fn resolve_channel(&self) -> PowertripResult<()> {
        if self.state.lock().channel_missing {
            return Err(MirrorError::new(MirrorErrorKind::ChannelNotFound(1)).into());
        }
        Ok(())
    }

    async fn list_messages(&self) -> PowertripResult<Vec<ChannelMessage>> {
        let hang = self.state.lock().hang_list;
        if hang {
            std::future::pending::<()>().await;
        }
        self.check("list_messages")?;
        let state = self.state.lock();
        Ok(state
            .messages
            .iter()
            .rev()
            .take(state.window.unwrap_or(usize::MAX))
            .map(|m| ChannelMessage::new(m.handle, m.own, m.tag.clone()))
            .collect())
    }

    fn listing_window(&self) -> usize {
        self.state.lock().window.unwrap_or(usize::MAX)
    }

    async fn post_mirror(
        &self,
        item: &QueueItem,
        controls: &ControlSet,
    ) -> PowertripResult<MessageHandle> {
        self.check("post_mirror")?;
        self.state.lock().post_count += 1;
        Ok(self.push(true, Some(item.id().clone()), None, controls.clone()))
    }

    async fn post_notice(&self, text: &str) -> PowertripResult<MessageHandle> {
        self.check("post_notice")?;
        self.state.lock().notice_log.push(text.to_string());
        Ok(self.push(true, None, Some(text.to_string()), ControlSet::new()))
    }

    async fn post_audit(&self, text: &str) -> PowertripResult<()> {
        self.state.lock().audit_log.push(text.to_string());
        Ok(())
    }

    async fn delete_message(&self, handle: MessageHandle) -> PowertripResult<DeleteOutcome> {
        self.check("delete_message")?;
        let mut state = self.state.lock();
        state.delete_log.push(handle);
        let found = state
            .messages
            .iter()
            .find(|m| m.handle == handle)
            .map(|m| m.ghost);
        state.messages.retain(|m| m.handle != handle);
        match found {
            Some(false) => Ok(DeleteOutcome::Deleted),
            Some(true) | None => Ok(DeleteOutcome::AlreadyGone),
        }
    }

    async fn edit_controls(
        &self,
        handle: MessageHandle,
        controls: &ControlSet,
    ) -> PowertripResult<()> {
        self.check("edit_controls")?;
        let mut state = self.state.lock();
        match state.messages.iter_mut().find(|m| m.handle == handle) {
            Some(message) => {
                message.controls = controls.clone();
                Ok(())
            }
            None => Err(MirrorError::new(MirrorErrorKind::Http {
                status_code: 404,
                message: "Unknown Message".to_string(),
            })
            .into()),
        }
    }

    async fn purge(&self) -> PowertripResult<usize> {
        self.check("purge")?;
        let mut state = self.state.lock();
        let purged: Vec<MessageHandle> = state.messages.drain(..).map(|m| m.handle).collect();
        state.delete_log.extend(purged.iter().copied());
        Ok(purged.len())
    }

    async fn set_presence(&self, presence: Presence) -> PowertripResult<()> {
        self.check("set_presence")?;
        self.state.lock().presence_log.push(presence);
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "fake-mirror"
    }
}

/// Wired-up reconciler and dispatcher over the fakes.
pub struct Harness {
    /// Source fake
    pub source: Arc<FakeSource>,
    /// Mirror fake
    pub mirror: Arc<FakeMirror>,
    /// Dispatcher under test
    pub dispatcher: Arc<Dispatcher>,
    /// Reconciler under test
    pub reconciler: Arc<Reconciler>,
    /// Shared metrics
    pub metrics: QueueMetrics,
}

impl Harness {
    /// Harness with default capabilities and no settle delay.
    pub fn new() -> Self {
        Self::with_config(test_dispatcher_config().build().unwrap())
    }

    /// Harness with a custom dispatcher configuration.
    pub fn with_config(config: DispatcherConfig) -> Self {
        let source = FakeSource::new();
        let mirror = FakeMirror::new();
        let metrics = QueueMetrics::new();
        let dispatcher = Arc::new(Dispatcher::new(
            source.clone(),
            mirror.clone(),
            config,
            metrics.clone(),
        ));
        let reconciler = Arc::new(Reconciler::new(
            source.clone(),
            mirror.clone(),
            dispatcher.clone(),
            Duration::from_secs(5),
            metrics.clone(),
        ));
        Self {
            source,
            mirror,
            dispatcher,
            reconciler,
            metrics,
        }
    }
}

/// Dispatcher configuration builder preset for tests.
pub fn test_dispatcher_config() -> powertrip_queue::DispatcherConfigBuilder {
    let mut builder = DispatcherConfig::builder();
    builder
        .settle_delay(Duration::ZERO)
        .call_timeout(Duration::from_secs(5));
    builder
}
