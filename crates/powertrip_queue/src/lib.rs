//! Queue reconciliation, restart supervision and action dispatch.
//!
//! The [`Reconciler`] makes the mirror channel match the source queue once
//! per tick. The [`Supervisor`] runs ticks serially and waits out transient
//! failures. The [`Dispatcher`] executes moderation actions invoked from
//! mirror controls, at most once per mirror.
//!
//! # Example
//!
//! ```rust,ignore
//! use powertrip_queue::{Dispatcher, DispatcherConfig, QueueMetrics, Reconciler, StreamConfig, Supervisor};
//! use std::sync::Arc;
//!
//! let metrics = QueueMetrics::new();
//! let dispatcher = Arc::new(Dispatcher::new(source.clone(), mirror.clone(), DispatcherConfig::default(), metrics.clone()));
//! let reconciler = Arc::new(Reconciler::new(source, mirror.clone(), dispatcher, *config.call_timeout(), metrics.clone()));
//! let supervisor = Supervisor::new(reconciler, mirror, config, metrics);
//! supervisor.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod claims;
mod config;
mod dispatcher;
mod metrics;
mod reconciler;
mod supervisor;

pub use claims::ClaimLedger;
pub use config::{
    DispatcherConfig, DispatcherConfigBuilder, DispatcherConfigBuilderError, StreamConfig,
    StreamConfigBuilder, StreamConfigBuilderError,
};
pub use dispatcher::{BindingState, Dispatcher, NO_REASON};
pub use metrics::{MetricsSnapshot, QueueMetrics};
pub use reconciler::{ReconciliationPlan, Reconciler, TickReport};
pub use supervisor::{STOPPED_NOTICE, ShutdownHandle, StreamState, Supervisor, diagnostic_notice};
