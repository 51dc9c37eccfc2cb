//! Counters for the stream and the dispatcher.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector shared by the reconciler, supervisor and dispatcher.
#[derive(Debug, Clone)]
pub struct QueueMetrics {
    inner: Arc<QueueMetricsInner>,
}

#[derive(Debug)]
struct QueueMetricsInner {
    ticks: AtomicU64,
    tick_failures: AtomicU64,
    cooldowns: AtomicU64,
    mirrors_posted: AtomicU64,
    mirrors_deleted: AtomicU64,
    items_auto_removed: AtomicU64,
    actions: AtomicU64,
    action_failures: AtomicU64,
    last_tick_success: parking_lot::Mutex<Option<Instant>>,
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueueMetricsInner {
                ticks: AtomicU64::new(0),
                tick_failures: AtomicU64::new(0),
                cooldowns: AtomicU64::new(0),
                mirrors_posted: AtomicU64::new(0),
                mirrors_deleted: AtomicU64::new(0),
                items_auto_removed: AtomicU64::new(0),
                actions: AtomicU64::new(0),
                action_failures: AtomicU64::new(0),
                last_tick_success: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Records a tick attempt.
    pub fn record_tick(&self) {
        self.inner.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a tick that completed.
    pub fn record_tick_success(&self) {
        *self.inner.last_tick_success.lock() = Some(Instant::now());
    }

    /// Records a tick that failed or panicked.
    pub fn record_tick_failure(&self) {
        self.inner.tick_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records entry into the cooldown.
    pub fn record_cooldown(&self) {
        self.inner.cooldowns.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a posted mirror.
    pub fn record_post(&self) {
        self.inner.mirrors_posted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a deleted mirror (including ones already gone).
    pub fn record_delete(&self) {
        self.inner.mirrors_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an authorless item removed at the source.
    pub fn record_auto_remove(&self) {
        self.inner.items_auto_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an executed terminal action.
    pub fn record_action(&self) {
        self.inner.actions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed action.
    pub fn record_action_failure(&self) {
        self.inner.action_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets tick count.
    pub fn ticks(&self) -> u64 {
        self.inner.ticks.load(Ordering::Relaxed)
    }

    /// Gets tick failure count.
    pub fn tick_failures(&self) -> u64 {
        self.inner.tick_failures.load(Ordering::Relaxed)
    }

    /// Gets cooldown count.
    pub fn cooldowns(&self) -> u64 {
        self.inner.cooldowns.load(Ordering::Relaxed)
    }

    /// Gets posted mirror count.
    pub fn mirrors_posted(&self) -> u64 {
        self.inner.mirrors_posted.load(Ordering::Relaxed)
    }

    /// Gets deleted mirror count.
    pub fn mirrors_deleted(&self) -> u64 {
        self.inner.mirrors_deleted.load(Ordering::Relaxed)
    }

    /// Gets auto-removed item count.
    pub fn items_auto_removed(&self) -> u64 {
        self.inner.items_auto_removed.load(Ordering::Relaxed)
    }

    /// Gets executed action count.
    pub fn actions(&self) -> u64 {
        self.inner.actions.load(Ordering::Relaxed)
    }

    /// Gets failed action count.
    pub fn action_failures(&self) -> u64 {
        self.inner.action_failures.load(Ordering::Relaxed)
    }

    /// Gets time since the last completed tick.
    pub fn time_since_tick_success(&self) -> Option<std::time::Duration> {
        self.inner
            .last_tick_success
            .lock()
            .map(|instant| instant.elapsed())
    }

    /// Creates a serializable snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks(),
            tick_failures: self.tick_failures(),
            cooldowns: self.cooldowns(),
            mirrors_posted: self.mirrors_posted(),
            mirrors_deleted: self.mirrors_deleted(),
            items_auto_removed: self.items_auto_removed(),
            actions: self.actions(),
            action_failures: self.action_failures(),
            seconds_since_tick_success: self.time_since_tick_success().map(|d| d.as_secs()),
        }
    }
}

/// Serializable snapshot of queue metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Ticks attempted
    pub ticks: u64,
    /// Ticks that failed
    pub tick_failures: u64,
    /// Cooldowns entered
    pub cooldowns: u64,
    /// Mirrors posted
    pub mirrors_posted: u64,
    /// Mirrors deleted
    pub mirrors_deleted: u64,
    /// Authorless items removed at the source
    pub items_auto_removed: u64,
    /// Terminal actions executed
    pub actions: u64,
    /// Actions that failed
    pub action_failures: u64,
    /// Seconds since the last completed tick
    pub seconds_since_tick_success: Option<u64>,
}
