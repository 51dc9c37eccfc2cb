//! One reconciliation tick: diff the source queue against the mirrors and
//! apply the difference.

use crate::call::bounded;
use crate::{Dispatcher, QueueMetrics};
use derive_getters::Getters;
use powertrip_core::{
    ChannelMessage, DeleteOutcome, ItemId, MessageHandle, MirrorMessage, QueueItem, RemoveOptions,
};
use powertrip_error::PowertripResult;
use powertrip_interface::{MirrorChannel, SourceQueue};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// What one tick has to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct ReconciliationPlan {
    /// Mirrors whose item left the queue, plus duplicate mirrors
    to_delete: Vec<MirrorMessage>,
    /// Queue items without a mirror, oldest created first
    to_post: Vec<QueueItem>,
    /// Items present on both sides, with their mirror
    to_refresh: Vec<(MessageHandle, QueueItem)>,
    /// Key sets matched and nothing was duplicated
    unchanged: bool,
}

impl ReconciliationPlan {
    /// Diff the mirrors in the channel against the source queue.
    ///
    /// `mirrors` is in listing order and `queue` in fetch order (newest
    /// first). When an item has several mirrors the first listed is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use powertrip_core::{ItemId, ItemKind, MessageHandle, MirrorMessage, QueueItem};
    /// use powertrip_queue::ReconciliationPlan;
    /// use chrono::DateTime;
    ///
    /// let item = QueueItem::builder()
    ///     .id("a1")
    ///     .kind(ItemKind::Comment { body: "hi".to_string() })
    ///     .subreddit("rust")
    ///     .author(Some("ferris".to_string()))
    ///     .permalink("/r/rust/a1")
    ///     .created_at(DateTime::from_timestamp(1, 0).unwrap())
    ///     .build()
    ///     .unwrap();
    /// let stale = MirrorMessage::new(ItemId::from("zz"), MessageHandle::from(9));
    ///
    /// let plan = ReconciliationPlan::diff(vec![stale.clone()], vec![item]);
    /// assert_eq!(plan.to_delete(), &vec![stale]);
    /// assert_eq!(plan.to_post().len(), 1);
    /// assert!(!plan.unchanged());
    /// ```
    pub fn diff(mirrors: Vec<MirrorMessage>, queue: Vec<QueueItem>) -> Self {
        let mut live: HashMap<ItemId, MessageHandle> = HashMap::new();
        let mut to_delete = Vec::new();
        let mut duplicates = false;
        for mirror in mirrors {
            if live.contains_key(mirror.source_item_id()) {
                duplicates = true;
                to_delete.push(mirror);
            } else {
                live.insert(mirror.source_item_id().clone(), *mirror.handle());
            }
        }

        let mut seen = HashSet::new();
        let queue: Vec<QueueItem> = queue
            .into_iter()
            .filter(|item| seen.insert(item.id().clone()))
            .collect();
        let queued: HashSet<&ItemId> = queue.iter().map(|item| item.id()).collect();

        let mut stale: Vec<MirrorMessage> = live
            .iter()
            .filter(|(id, _)| !queued.contains(id))
            .map(|(id, handle)| MirrorMessage::new(id.clone(), *handle))
            .collect();
        stale.sort_by_key(|mirror| *mirror.handle());
        let unchanged = !duplicates && stale.is_empty() && live.len() == queue.len();
        to_delete.extend(stale);

        let mut to_post = Vec::new();
        let mut to_refresh = Vec::new();
        for item in queue.into_iter().rev() {
            match live.get(item.id()) {
                Some(handle) => to_refresh.push((*handle, item)),
                None => to_post.push(item),
            }
        }
        to_post.sort_by_key(|item| *item.created_at());

        Self {
            to_delete,
            to_post,
            to_refresh,
            unchanged,
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Getters)]
pub struct TickReport {
    /// Mirrors deleted
    deleted: usize,
    /// Mirrors that were already gone when deleted
    already_gone: usize,
    /// Mirrors posted
    posted: usize,
    /// Mirrors whose snapshot was refreshed
    refreshed: usize,
    /// Authorless items removed at the source
    auto_removed: usize,
    /// Items left unposted because the listing window was full
    deferred: usize,
    /// Bindings dropped because their mirror vanished from the channel
    unbound: usize,
    /// Nothing differed between the queue and the channel
    short_circuited: bool,
}

/// Diffs the source queue against the mirror channel.
pub struct Reconciler {
    source: Arc<dyn SourceQueue>,
    mirror: Arc<dyn MirrorChannel>,
    dispatcher: Arc<Dispatcher>,
    call_timeout: Duration,
    metrics: QueueMetrics,
}

impl Reconciler {
    /// Creates a new reconciler.
    pub fn new(
        source: Arc<dyn SourceQueue>,
        mirror: Arc<dyn MirrorChannel>,
        dispatcher: Arc<Dispatcher>,
        call_timeout: Duration,
        metrics: QueueMetrics,
    ) -> Self {
        Self {
            source,
            mirror,
            dispatcher,
            call_timeout,
            metrics,
        }
    }

    /// Run one tick. Any failed fetch, delete or post aborts the tick.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> PowertripResult<TickReport> {
        let mut report = TickReport::default();

        let listed = bounded(
            "list_messages",
            self.call_timeout,
            self.mirror.list_messages(),
        )
        .await?;
        let mirrors: Vec<MirrorMessage> = listed
            .iter()
            .filter_map(ChannelMessage::as_mirror)
            .collect();
        let present: HashSet<MessageHandle> = mirrors.iter().map(|m| *m.handle()).collect();
        report.unbound = self.dispatcher.retain_bindings(&present);
        if report.unbound > 0 {
            warn!(count = report.unbound, "Mirrors were deleted outside the stream");
        }

        let fetched = bounded("list_queue", self.call_timeout, self.source.list_queue()).await?;
        let mut queue = Vec::with_capacity(fetched.len());
        for item in fetched {
            if item.author().is_some() {
                queue.push(item);
                continue;
            }
            bounded(
                "remove",
                self.call_timeout,
                self.source.remove(&item, &RemoveOptions::default()),
            )
            .await?;
            info!(item_id = %item.id(), "Removed item with no resolvable author");
            self.metrics.record_auto_remove();
            report.auto_removed += 1;
        }
        debug!(mirrors = mirrors.len(), queued = queue.len(), "Fetched both sides");

        let plan = ReconciliationPlan::diff(mirrors, queue);
        report.short_circuited = plan.unchanged;
        let remaining = listed.len().saturating_sub(plan.to_delete.len());
        let room = self.mirror.listing_window().saturating_sub(remaining);

        for (handle, item) in plan.to_refresh {
            self.dispatcher.refresh(handle, item);
            report.refreshed += 1;
        }

        if plan.unchanged {
            debug!("Queue and channel already agree");
            return Ok(report);
        }

        for mirror in plan.to_delete {
            let outcome = bounded(
                "delete_message",
                self.call_timeout,
                self.mirror.delete_message(*mirror.handle()),
            )
            .await?;
            self.dispatcher.unbind(*mirror.handle());
            self.metrics.record_delete();
            match outcome {
                DeleteOutcome::Deleted => report.deleted += 1,
                DeleteOutcome::AlreadyGone => {
                    warn!(item_id = %mirror.source_item_id(), "Stale mirror was already gone");
                    report.already_gone += 1;
                }
            }
        }

        let mut to_post = plan.to_post;
        if to_post.len() > room {
            report.deferred = to_post.len() - room;
            warn!(
                deferred = report.deferred,
                window = self.mirror.listing_window(),
                "Listing window is full, deferring the newest items"
            );
            to_post.truncate(room);
        }

        for item in to_post {
            let controls = self.dispatcher.initial_controls(&item);
            let handle = bounded(
                "post_mirror",
                self.call_timeout,
                self.mirror.post_mirror(&item, &controls),
            )
            .await?;
            debug!(item_id = %item.id(), %handle, "Posted mirror");
            self.dispatcher.bind(handle, item);
            self.metrics.record_post();
            report.posted += 1;
        }

        info!(
            deleted = report.deleted,
            already_gone = report.already_gone,
            posted = report.posted,
            deferred = report.deferred,
            auto_removed = report.auto_removed,
            "Reconciled queue"
        );
        Ok(report)
    }
}
