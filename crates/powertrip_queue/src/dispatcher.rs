//! Action dispatch: the controls on each mirror and the handlers behind them.
//!
//! Every posted mirror is bound to a snapshot of its queue item. Terminal
//! actions (approve, remove, confirm, ban) claim the mirror in a
//! [`ClaimLedger`] before touching the source, so each mirror causes at most
//! one source mutation. Failures never escape an invocation; they replace the
//! mirror's controls with a disabled error indicator.

use crate::call::bounded;
use crate::{ClaimLedger, DispatcherConfig, QueueMetrics};
use async_trait::async_trait;
use parking_lot::Mutex;
use powertrip_core::{
    Action, ActionId, BanDuration, BanRequest, Button, ButtonStyle, ControlSet, MAX_SELECT_OPTIONS,
    MessageHandle, QueueItem, RemovalReason, RemoveOptions, SelectMenu, SelectOption,
};
use powertrip_error::{
    ActionError, ActionErrorKind, PowertripError, PowertripResult, SourceError, SourceErrorKind,
};
use powertrip_interface::{ComponentEvent, InteractionSink, MirrorChannel, SourceQueue};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Select value standing for "remove without a reason".
pub const NO_REASON: &str = "none";

const MAX_NOTE_LEN: usize = 300;
const MAX_BAN_REASON_LEN: usize = 100;
const MAX_EXCERPT_LEN: usize = 900;

/// Where a bound mirror is in its interaction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BindingState {
    /// Showing the initial controls
    Initial,
    /// Showing the removal reason picker
    PickingReason,
    /// Showing the error indicator
    Failed,
}

#[derive(Debug, Clone)]
enum Flow {
    Initial,
    Reasons {
        reasons: Vec<RemovalReason>,
        selected: Option<String>,
    },
    Failed,
}

#[derive(Debug, Clone)]
struct Binding {
    item: QueueItem,
    flow: Flow,
}

/// Executes moderation actions invoked from mirror controls.
pub struct Dispatcher {
    source: Arc<dyn SourceQueue>,
    mirror: Arc<dyn MirrorChannel>,
    config: DispatcherConfig,
    bindings: Mutex<HashMap<MessageHandle, Binding>>,
    claims: ClaimLedger,
    metrics: QueueMetrics,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        source: Arc<dyn SourceQueue>,
        mirror: Arc<dyn MirrorChannel>,
        config: DispatcherConfig,
        metrics: QueueMetrics,
    ) -> Self {
        let claims = ClaimLedger::new(*config.completed_claims());
        Self {
            source,
            mirror,
            config,
            bindings: Mutex::new(HashMap::new()),
            claims,
            metrics,
        }
    }

    /// Controls a freshly posted mirror starts with.
    ///
    /// The first row holds approve, remove and, when enabled for the kind,
    /// the removal reason picker. Ban buttons follow on their own rows.
    pub fn initial_controls(&self, item: &QueueItem) -> ControlSet {
        let id = |action| ActionId::new(item.id().clone(), action);
        let kind = item.kind().tag();
        let capabilities = self.config.capabilities();

        let mut first_row = vec![
            Button::new(&id(Action::Approve), "Approve", ButtonStyle::Primary),
            Button::new(&id(Action::Remove), "Remove", ButtonStyle::Danger),
        ];
        if capabilities.reasons_enabled(kind) {
            first_row.push(Button::new(
                &id(Action::Reasons),
                "Remove with reason…",
                ButtonStyle::Secondary,
            ));
        }

        let mut controls = ControlSet::new().with_buttons(first_row);
        if capabilities.bans_enabled(kind) {
            let bans = capabilities.ban_options().into_iter().map(|duration| {
                Button::new(&id(Action::Ban(duration)), duration.label(), ButtonStyle::Danger)
            });
            controls = controls.with_buttons(bans);
        }
        controls
    }

    fn reason_controls(item: &QueueItem, reasons: &[RemovalReason]) -> ControlSet {
        let id = |action| ActionId::new(item.id().clone(), action);
        let options = std::iter::once(SelectOption::new(NO_REASON, "No Reason", true))
            .chain(
                reasons
                    .iter()
                    .take(MAX_SELECT_OPTIONS - 1)
                    .map(|reason| SelectOption::new(reason.id().clone(), reason.title(), false)),
            )
            .collect();

        ControlSet::new()
            .with_select(SelectMenu::new(&id(Action::Reason), "Removal reason", options))
            .with_buttons([
                Button::new(&id(Action::Confirm), "Remove", ButtonStyle::Danger),
                Button::new(&id(Action::Cancel), "Cancel", ButtonStyle::Secondary),
            ])
    }

    /// Bind a newly posted mirror to its item.
    pub fn bind(&self, handle: MessageHandle, item: QueueItem) {
        self.bindings.lock().insert(
            handle,
            Binding {
                item,
                flow: Flow::Initial,
            },
        );
    }

    /// Update the snapshot behind an existing mirror, binding it if unknown.
    pub fn refresh(&self, handle: MessageHandle, item: QueueItem) {
        let mut bindings = self.bindings.lock();
        match bindings.get_mut(&handle) {
            Some(binding) => binding.item = item,
            None => {
                bindings.insert(
                    handle,
                    Binding {
                        item,
                        flow: Flow::Initial,
                    },
                );
            }
        }
    }

    /// Forget a mirror.
    pub fn unbind(&self, handle: MessageHandle) {
        self.bindings.lock().remove(&handle);
    }

    /// Forget every mirror not in `present`. Returns how many were dropped.
    pub fn retain_bindings(&self, present: &HashSet<MessageHandle>) -> usize {
        let mut bindings = self.bindings.lock();
        let before = bindings.len();
        bindings.retain(|handle, _| present.contains(handle));
        before - bindings.len()
    }

    /// Flow state of a bound mirror.
    pub fn binding_state(&self, handle: MessageHandle) -> Option<BindingState> {
        self.bindings
            .lock()
            .get(&handle)
            .map(|binding| match binding.flow {
                Flow::Initial => BindingState::Initial,
                Flow::Reasons { .. } => BindingState::PickingReason,
                Flow::Failed => BindingState::Failed,
            })
    }

    /// Number of bound mirrors.
    pub fn bound_count(&self) -> usize {
        self.bindings.lock().len()
    }

    fn snapshot(&self, handle: MessageHandle) -> Option<QueueItem> {
        self.bindings
            .lock()
            .get(&handle)
            .map(|binding| binding.item.clone())
    }

    fn set_flow(&self, handle: MessageHandle, flow: Flow) {
        if let Some(binding) = self.bindings.lock().get_mut(&handle) {
            binding.flow = flow;
        }
    }

    fn selected_reason(&self, handle: MessageHandle) -> Option<RemovalReason> {
        match self.bindings.lock().get(&handle) {
            Some(Binding {
                flow:
                    Flow::Reasons {
                        reasons,
                        selected: Some(selected),
                    },
                ..
            }) => reasons.iter().find(|reason| reason.id() == selected).cloned(),
            _ => None,
        }
    }

    /// Handle one control invocation. Never fails.
    #[instrument(
        skip(self, event),
        fields(handle = %event.handle(), custom_id = %event.custom_id(), actor = %event.actor())
    )]
    pub async fn dispatch(&self, event: ComponentEvent) {
        let id: ActionId = match event.custom_id().parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Ignoring unrecognized control");
                return;
            }
        };
        let handle = *event.handle();

        let Some(item) = self.snapshot(handle) else {
            info!("Ignoring control on unbound message");
            return;
        };

        if item.id() != id.item_id() {
            let mismatch = ActionError::new(ActionErrorKind::ItemMismatch {
                control: id.item_id().to_string(),
                bound: item.id().to_string(),
            });
            warn!(error = %mismatch, "Ignoring control");
            return;
        }

        if self.claims.is_claimed(handle) {
            debug!("Mirror already claimed, dropping invocation");
            return;
        }

        match *id.action() {
            Action::Error => debug!("Error indicator invoked"),
            Action::Reasons => self.open_reasons(handle, &item).await,
            Action::Reason => self.select_reason(handle, event.values()),
            Action::Cancel => self.cancel(handle, &item).await,
            action => self.run_terminal(handle, &item, action, event.actor()).await,
        }
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    async fn open_reasons(&self, handle: MessageHandle, item: &QueueItem) {
        let limit = *self.config.call_timeout();
        let reasons = match bounded(
            "removal_reasons",
            limit,
            self.source.removal_reasons(item.subreddit()),
        )
        .await
        {
            Ok(reasons) => reasons,
            Err(e) => return self.fail(handle, item, e).await,
        };

        debug!(count = reasons.len(), "Fetched removal reasons");
        let controls = Self::reason_controls(item, &reasons);
        self.set_flow(
            handle,
            Flow::Reasons {
                reasons,
                selected: None,
            },
        );

        if let Err(e) = bounded(
            "edit_controls",
            limit,
            self.mirror.edit_controls(handle, &controls),
        )
        .await
        {
            self.fail(handle, item, e).await;
        }
    }

    fn select_reason(&self, handle: MessageHandle, values: &[String]) {
        let choice = values
            .first()
            .filter(|value| value.as_str() != NO_REASON)
            .cloned();

        let mut bindings = self.bindings.lock();
        match bindings.get_mut(&handle) {
            Some(Binding {
                flow: Flow::Reasons { reasons, selected },
                ..
            }) => match choice {
                Some(choice) if !reasons.iter().any(|reason| reason.id() == &choice) => {
                    warn!(reason_id = %choice, "Selected reason is not offered");
                }
                choice => {
                    debug!(reason_id = ?choice, "Recorded removal reason");
                    *selected = choice;
                }
            },
            _ => debug!("Reason selected outside the reason picker"),
        }
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    async fn cancel(&self, handle: MessageHandle, item: &QueueItem) {
        self.set_flow(handle, Flow::Initial);
        let controls = self.initial_controls(item);
        if let Err(e) = bounded(
            "edit_controls",
            *self.config.call_timeout(),
            self.mirror.edit_controls(handle, &controls),
        )
        .await
        {
            self.fail(handle, item, e).await;
        }
    }

    #[instrument(skip(self, item, actor), fields(item_id = %item.id(), action = %action))]
    async fn run_terminal(&self, handle: MessageHandle, item: &QueueItem, action: Action, actor: &str) {
        if !self.claims.try_claim(handle) {
            debug!("Mirror already claimed, dropping invocation");
            return;
        }
        self.metrics.record_action();

        let reason = self.selected_reason(handle);
        match self.execute(item, action, actor, reason.as_ref()).await {
            Ok(summary) => {
                self.claims.complete(handle);
                info!(%summary, "Action completed");
                self.finish(handle, item, actor, &summary).await;
            }
            Err(e) => {
                self.claims.release(handle);
                self.fail(handle, item, e).await;
            }
        }
    }

    async fn execute(
        &self,
        item: &QueueItem,
        action: Action,
        actor: &str,
        reason: Option<&RemovalReason>,
    ) -> PowertripResult<String> {
        let limit = *self.config.call_timeout();
        match action {
            Action::Approve => {
                if *item.locked() {
                    bounded("unlock", limit, self.source.unlock(item)).await?;
                }
                bounded("approve", limit, self.source.approve(item)).await?;
                Ok("approved".to_string())
            }
            Action::Remove => {
                bounded(
                    "remove",
                    limit,
                    self.source.remove(item, &RemoveOptions::default()),
                )
                .await?;
                Ok("removed".to_string())
            }
            Action::Confirm => {
                let options = RemoveOptions {
                    mod_note: Some(mod_note(actor)),
                    reason_id: reason.map(|reason| reason.id().clone()),
                };
                bounded("remove", limit, self.source.remove(item, &options)).await?;

                let message = reason
                    .filter(|_| *self.config.send_removal_messages())
                    .and_then(RemovalReason::removal_message);
                if let Some(message) = message {
                    bounded(
                        "send_removal_message",
                        limit,
                        self.source.send_removal_message(item, &message),
                    )
                    .await?;
                }

                Ok(match reason {
                    Some(reason) => format!("removed ({})", reason.title()),
                    None => "removed".to_string(),
                })
            }
            Action::Ban(duration) => {
                let request = self.ban_request(item, duration, actor)?;
                bounded(
                    "remove",
                    limit,
                    self.source.remove(item, &RemoveOptions::default()),
                )
                .await?;
                bounded("ban_author", limit, self.source.ban_author(&request)).await?;
                Ok(match duration {
                    BanDuration::Days(days) => {
                        format!("removed and banned u/{} for {} days", request.author(), days)
                    }
                    BanDuration::Permanent => {
                        format!("removed and permanently banned u/{}", request.author())
                    }
                })
            }
            Action::Reasons | Action::Reason | Action::Cancel | Action::Error => Err(
                ActionError::new(ActionErrorKind::UnrecognizedControl(action.to_string())).into(),
            ),
        }
    }

    fn ban_request(
        &self,
        item: &QueueItem,
        duration: BanDuration,
        actor: &str,
    ) -> PowertripResult<BanRequest> {
        let author = item
            .author()
            .clone()
            .ok_or_else(|| SourceError::new(SourceErrorKind::MissingAuthor(item.fullname())))?;

        let ban_message = self
            .config
            .ban_message_excerpt()
            .then(|| format!("[{}]({})", truncate(item.headline(), MAX_EXCERPT_LEN), item.link()));
        let ban_reason = item
            .reports()
            .first()
            .map(|report| truncate(report.text(), MAX_BAN_REASON_LEN));

        BanRequest::builder()
            .subreddit(item.subreddit().clone())
            .author(author)
            .duration(duration)
            .note(truncate(&mod_note(actor), MAX_NOTE_LEN))
            .ban_message(ban_message)
            .ban_reason(ban_reason)
            .context(item.fullname())
            .build()
            .map_err(|e| ActionError::new(ActionErrorKind::InvalidRequest(e.to_string())).into())
    }

    async fn finish(&self, handle: MessageHandle, item: &QueueItem, actor: &str, summary: &str) {
        let limit = *self.config.call_timeout();
        tokio::time::sleep(*self.config.settle_delay()).await;

        match bounded("delete_message", limit, self.mirror.delete_message(handle)).await {
            Ok(outcome) => debug!(%outcome, "Mirror deleted"),
            Err(e) => warn!(error = ?e, "Failed to delete mirror after action"),
        }
        self.unbind(handle);

        let line = format!("{} {} {} <{}>", actor, summary, item.fullname(), item.link());
        if let Err(e) = bounded("post_audit", limit, self.mirror.post_audit(&line)).await {
            warn!(error = ?e, "Failed to write audit line");
        }
    }

    async fn fail(&self, handle: MessageHandle, item: &QueueItem, error: PowertripError) {
        error!(item_id = %item.id(), error = ?error, "Action failed");
        self.metrics.record_action_failure();
        self.set_flow(handle, Flow::Failed);

        let controls = ControlSet::error(item.id(), &error.summary());
        if let Err(e) = bounded(
            "edit_controls",
            *self.config.call_timeout(),
            self.mirror.edit_controls(handle, &controls),
        )
        .await
        {
            error!(error = ?e, "Failed to mark mirror as errored");
        }
    }
}

#[async_trait]
impl InteractionSink for Dispatcher {
    async fn on_component(&self, event: ComponentEvent) {
        self.dispatch(event).await;
    }
}

fn mod_note(actor: &str) -> String {
    format!("{} via PowerTrip", actor)
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
