//! Process wiring: builds the clients and runs the stream.

use crate::PowertripSettings;
use powertrip_discord::{DiscordMirror, GatewayState, MirrorBot};
use powertrip_error::{MirrorError, MirrorErrorKind, PowertripError, PowertripResult, TaskError};
use powertrip_interface::{MirrorChannel, SourceQueue};
use powertrip_queue::{Dispatcher, QueueMetrics, Reconciler, Supervisor};
use powertrip_reddit::RedditQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{error, info, instrument, warn};

/// How long the gateway gets to close after the stream stops.
const GATEWAY_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the mirror until a fatal error, a gateway failure, or a shutdown
/// signal.
///
/// # Errors
///
/// Returns the fatal error that stopped the stream, or the error that
/// closed the Discord gateway.
#[instrument(skip_all)]
pub async fn run_mirror(settings: &PowertripSettings) -> PowertripResult<()> {
    let discord_config = settings.discord_config()?;
    let stream_config = settings.stream_config()?;
    let dispatcher_config = settings.dispatcher_config()?;

    let source: Arc<dyn SourceQueue> = Arc::new(RedditQueue::new(settings.reddit_config()?)?);

    let state = Arc::new(GatewayState::new());
    let mut bot = MirrorBot::new(&discord_config, Arc::clone(&state)).await?;
    let mirror: Arc<dyn MirrorChannel> = Arc::new(DiscordMirror::new(
        bot.http(),
        Arc::clone(&state),
        &discord_config,
    ));

    let metrics = QueueMetrics::new();
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&source),
        Arc::clone(&mirror),
        dispatcher_config,
        metrics.clone(),
    ));
    if !state.attach_sink(dispatcher.clone()) {
        warn!("Interaction sink was already attached");
    }
    let reconciler = Arc::new(Reconciler::new(
        source,
        Arc::clone(&mirror),
        dispatcher,
        *stream_config.call_timeout(),
        metrics.clone(),
    ));
    let supervisor = Supervisor::new(reconciler, mirror, stream_config, metrics.clone());
    let shutdown = supervisor.shutdown_handle();

    let shard_manager = bot.shard_manager();
    let mut gateway = tokio::spawn(async move { bot.start().await });

    let signal_shutdown = shutdown.clone();
    let signals = tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping the stream");
        signal_shutdown.shutdown();
    });

    let run = supervisor.run();
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        closed = &mut gateway => {
            let error = gateway_closed(closed);
            error!(error = ?error, "Discord gateway closed, stopping the stream");
            shutdown.shutdown();
            if let Err(e) = (&mut run).await {
                warn!(error = ?e, "Stream also failed while stopping");
            }
            signals.abort();
            info!(metrics = ?metrics.snapshot(), "Mirror stopped");
            return Err(error);
        }
    };

    signals.abort();
    shard_manager.shutdown_all().await;
    match tokio::time::timeout(GATEWAY_CLOSE_TIMEOUT, gateway).await {
        Ok(Ok(Ok(()))) => {}
        Ok(closed) => warn!(error = ?gateway_closed(closed), "Gateway closed with an error"),
        Err(_) => warn!("Gateway did not close in time"),
    }

    info!(metrics = ?metrics.snapshot(), "Mirror stopped");
    outcome
}

/// Describe why the gateway task ended.
fn gateway_closed(joined: Result<PowertripResult<()>, JoinError>) -> PowertripError {
    match joined {
        Ok(Ok(())) => MirrorError::new(MirrorErrorKind::Serenity(
            "gateway closed unexpectedly".to_string(),
        ))
        .into(),
        Ok(Err(e)) => e,
        Err(e) => TaskError::new(format!("gateway task ended abnormally: {}", e)).into(),
    }
}

/// Resolve on SIGINT (Ctrl+C) or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                return wait_for_ctrl_c().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = wait_for_ctrl_c() => info!("Received Ctrl+C"),
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
        info!("Received Ctrl+C");
    }
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
