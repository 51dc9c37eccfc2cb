//! Lifecycle and restart supervision around the reconciliation loop.
//!
//! ```text
//! NotStarted ──start ok──▶ Running ──tick fails──▶ PausedForCooldown
//!     │                     ▲   │                        │
//!     └──start fails──▶ ────┼───┼──── cooldown, resume ──┘
//!                           │   └──shutdown──▶ Stopped
//! ```
//!
//! Ticks are strictly serial and each runs to completion in its own task.
//! The inter-tick sleep and the cooldown are interruptible; a running tick
//! is not. Fatal errors stop the supervisor and are returned to the caller.

use crate::call::bounded;
use crate::{QueueMetrics, Reconciler, StreamConfig};
use powertrip_core::{ChannelMessage, Presence};
use powertrip_error::{PowertripError, PowertripResult, TaskError};
use powertrip_interface::MirrorChannel;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Notice posted when the stream shuts down.
pub const STOPPED_NOTICE: &str = "The modqueue stream has stopped.";

/// Lifecycle state of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StreamState {
    /// Waiting for the first successful startup
    NotStarted,
    /// Ticking on the configured interval
    Running,
    /// Waiting out the cooldown after a failure
    PausedForCooldown,
    /// Shut down
    Stopped,
}

/// Requests a supervisor shutdown. Cloneable; any clone can stop the stream.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask the supervisor to stop after the current tick.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Startup,
    Resume,
    Tick,
}

/// Drives the reconciler through startup, ticks, cooldowns and shutdown.
pub struct Supervisor {
    reconciler: Arc<Reconciler>,
    mirror: Arc<dyn MirrorChannel>,
    config: StreamConfig,
    metrics: QueueMetrics,
    state: watch::Sender<StreamState>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Supervisor {
    /// Creates a new supervisor in [`StreamState::NotStarted`].
    pub fn new(
        reconciler: Arc<Reconciler>,
        mirror: Arc<dyn MirrorChannel>,
        config: StreamConfig,
        metrics: QueueMetrics,
    ) -> Self {
        let (state, _) = watch::channel(StreamState::NotStarted);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            reconciler,
            mirror,
            config,
            metrics,
            state,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    /// A handle that stops the stream.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    fn transition(&self, next: StreamState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(from = %previous, to = %next, "Stream state changed");
        }
    }

    fn stop_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Run until shutdown (`Ok`) or a fatal error (`Err`).
    #[instrument(skip(self))]
    pub async fn run(self) -> PowertripResult<()> {
        let mut phase = Phase::Startup;
        let mut started = false;

        while !self.stop_requested() {
            let result = match phase {
                Phase::Startup => self.start().await,
                Phase::Resume => self.resume().await,
                Phase::Tick => self.tick().await,
            };

            match result {
                Ok(()) if self.stop_requested() => break,
                Ok(()) => {
                    self.transition(StreamState::Running);
                    if phase == Phase::Tick {
                        if !self.sleep_unless_stopped(*self.config.tick_interval()).await {
                            break;
                        }
                    } else {
                        started = true;
                        phase = Phase::Tick;
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(error = ?e, "Fatal error, stopping stream");
                    self.transition(StreamState::Stopped);
                    return Err(e);
                }
                Err(e) => {
                    if phase == Phase::Tick {
                        self.metrics.record_tick_failure();
                    }
                    phase = if started { Phase::Resume } else { Phase::Startup };
                    self.enter_cooldown(&e, started).await;
                    if !self.sleep_unless_stopped(*self.config.cooldown()).await {
                        break;
                    }
                }
            }
        }

        if started {
            self.best_effort("post_notice", self.mirror.post_notice(STOPPED_NOTICE))
                .await;
        }
        self.transition(StreamState::Stopped);
        info!("Stream stopped");
        Ok(())
    }

    /// Wait for the gateway, verify the channel, clear it, show presence.
    #[instrument(skip(self))]
    async fn start(&self) -> PowertripResult<()> {
        let limit = *self.config.call_timeout();
        let mut shutdown = self.shutdown_rx.clone();
        tokio::select! {
            ready = self.mirror.wait_until_ready() => ready?,
            _ = wait_for_shutdown(&mut shutdown) => return Ok(()),
        }

        bounded("resolve_channel", limit, self.mirror.resolve_channel()).await?;
        let purged = bounded("purge", limit, self.mirror.purge()).await?;
        info!(purged, "Cleared mirror channel");

        self.best_effort(
            "set_presence",
            self.mirror.set_presence(Presence::watching_reddit()),
        )
        .await;
        Ok(())
    }

    /// Remove leftover notices and restore the healthy presence.
    #[instrument(skip(self))]
    async fn resume(&self) -> PowertripResult<()> {
        let limit = *self.config.call_timeout();
        let listed = bounded("list_messages", limit, self.mirror.list_messages()).await?;
        let notices: Vec<&ChannelMessage> = listed.iter().filter(|m| m.is_notice()).collect();
        for notice in &notices {
            bounded(
                "delete_message",
                limit,
                self.mirror.delete_message(*notice.handle()),
            )
            .await?;
        }
        debug!(removed = notices.len(), "Removed stale notices");

        self.best_effort("set_presence", self.mirror.set_presence(Presence::watching_reddit()))
            .await;
        Ok(())
    }

    /// Run one reconciliation tick in its own task.
    async fn tick(&self) -> PowertripResult<()> {
        self.metrics.record_tick();
        let reconciler = Arc::clone(&self.reconciler);
        let report = match tokio::spawn(async move { reconciler.tick().await }).await {
            Ok(result) => result?,
            Err(e) => {
                error!(error = %e, "Tick task ended abnormally");
                return Err(TaskError::new(format!("tick task ended abnormally: {}", e)).into());
            }
        };
        self.metrics.record_tick_success();
        debug!(?report, metrics = ?self.metrics.snapshot(), "Tick complete");
        Ok(())
    }

    async fn enter_cooldown(&self, error: &PowertripError, started: bool) {
        warn!(
            error = ?error,
            cooldown_secs = self.config.cooldown().as_secs(),
            "Stream failed, entering cooldown"
        );
        self.metrics.record_cooldown();
        self.transition(StreamState::PausedForCooldown);

        self.best_effort("set_presence", self.mirror.set_presence(Presence::Degraded))
            .await;
        if started {
            let notice = diagnostic_notice(error, *self.config.cooldown());
            self.best_effort("post_notice", self.mirror.post_notice(&notice))
                .await;
        }
    }

    async fn best_effort<T, F>(&self, operation: &'static str, call: F)
    where
        F: std::future::Future<Output = PowertripResult<T>>,
    {
        if let Err(e) = bounded(operation, *self.config.call_timeout(), call).await {
            warn!(operation, error = ?e, "Best-effort call failed");
        }
    }

    /// Sleep for `duration`. Returns false if shutdown was requested first.
    async fn sleep_unless_stopped(&self, duration: Duration) -> bool {
        let mut shutdown = self.shutdown_rx.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = wait_for_shutdown(&mut shutdown) => false,
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Text of the notice posted on entering the cooldown.
///
/// # Examples
///
/// ```
/// use powertrip_error::{PowertripError, TaskError};
/// use powertrip_queue::diagnostic_notice;
/// use std::time::Duration;
///
/// let error: PowertripError = TaskError::new("boom").into();
/// let notice = diagnostic_notice(&error, Duration::from_secs(300));
/// assert_eq!(
///     notice,
///     "The stream has encountered an error:\n`boom`\nTrying again in 5 minutes."
/// );
/// ```
pub fn diagnostic_notice(error: &PowertripError, cooldown: Duration) -> String {
    format!(
        "The stream has encountered an error:\n`{}`\nTrying again in {}.",
        error.summary(),
        describe_wait(cooldown)
    )
}

fn describe_wait(wait: Duration) -> String {
    let secs = wait.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) if minutes > 0 => format!("{} minutes", minutes),
        (0, 1) => "1 second".to_string(),
        _ => format!("{} seconds", secs),
    }
}
