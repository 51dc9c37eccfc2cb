//! Gateway session shared between the event handler and the mirror.

use powertrip_error::{MirrorError, MirrorErrorKind, PowertripResult};
use powertrip_interface::InteractionSink;
use serenity::all::{ShardMessenger, UserId};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, info};

/// What the ready event tells us about our own connection.
#[derive(Clone)]
pub struct GatewaySession {
    bot_user: UserId,
    shard: ShardMessenger,
}

impl GatewaySession {
    /// Create a session from the ready payload.
    pub fn new(bot_user: UserId, shard: ShardMessenger) -> Self {
        Self { bot_user, shard }
    }

    /// The bot's own user id. Messages by this id are ours.
    pub fn bot_user(&self) -> UserId {
        self.bot_user
    }

    /// Messenger for presence updates.
    pub fn shard(&self) -> &ShardMessenger {
        &self.shard
    }
}

/// Readiness and interaction routing for one gateway connection.
///
/// The session is replaced on every ready event, so reconnects pick up the
/// fresh shard messenger.
pub struct GatewayState {
    session: watch::Sender<Option<GatewaySession>>,
    sink: OnceLock<Arc<dyn InteractionSink>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            session,
            sink: OnceLock::new(),
        }
    }
}

impl GatewayState {
    /// A state awaiting its first ready event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ready event.
    pub fn publish(&self, session: GatewaySession) {
        info!(bot_user = %session.bot_user, "Gateway session published");
        self.session.send_replace(Some(session));
    }

    /// Current session, if the gateway has been ready at least once.
    pub fn session(&self) -> Option<GatewaySession> {
        self.session.borrow().clone()
    }

    /// Current session or a transient not-ready error.
    pub fn require_session(&self) -> PowertripResult<GatewaySession> {
        self.session()
            .ok_or_else(|| MirrorError::new(MirrorErrorKind::NotReady).into())
    }

    /// Wait for the first ready event.
    pub async fn wait_until_ready(&self) -> PowertripResult<()> {
        let mut rx = self.session.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .map_err(|_| MirrorError::new(MirrorErrorKind::NotReady))?;
        debug!("Gateway ready");
        Ok(())
    }

    /// Route interactions to `sink`. Only the first attached sink is kept.
    pub fn attach_sink(&self, sink: Arc<dyn InteractionSink>) -> bool {
        self.sink.set(sink).is_ok()
    }

    /// The attached sink.
    pub fn sink(&self) -> Option<&Arc<dyn InteractionSink>> {
        self.sink.get()
    }
}
