//! Serenity event handler.

use crate::{GatewaySession, GatewayState};
use powertrip_core::{ActionId, MessageHandle};
use powertrip_interface::ComponentEvent;
use serenity::all::{
    ComponentInteraction, ComponentInteractionDataKind, CreateInteractionResponse, GatewayIntents,
    Interaction, Ready,
};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Publishes readiness and forwards mirror control clicks.
pub struct MirrorHandler {
    state: Arc<GatewayState>,
}

impl MirrorHandler {
    /// Create a handler feeding `state`.
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }

    /// Gateway intents the mirror needs.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES
    }

    fn component_event(component: &ComponentInteraction) -> Option<ComponentEvent> {
        let values = match &component.data.kind {
            ComponentInteractionDataKind::StringSelect { values } => values.clone(),
            _ => Vec::new(),
        };
        ComponentEvent::builder()
            .handle(MessageHandle::from(component.message.id.get()))
            .custom_id(component.data.custom_id.clone())
            .values(values)
            .actor(component.user.name.clone())
            .build()
            .map_err(|e| error!(error = %e, "Failed to build component event"))
            .ok()
    }

    #[instrument(skip_all, fields(custom_id = %component.data.custom_id, actor = %component.user.name))]
    async fn on_component(&self, ctx: &Context, component: ComponentInteraction) {
        // Unacknowledged interactions show a failure to the clicking user.
        if let Err(e) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            warn!(error = %e, "Failed to acknowledge interaction");
        }

        let Some(event) = Self::component_event(&component) else {
            return;
        };
        match self.state.sink() {
            Some(sink) => sink.on_component(event).await,
            None => warn!("Interaction received before the dispatcher was attached"),
        }
    }
}

#[async_trait]
impl EventHandler for MirrorHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            user_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Discord gateway ready"
        );
        self.state
            .publish(GatewaySession::new(ready.user.id, ctx.shard.clone()));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) if ActionId::is_ours(&component.data.custom_id) => {
                self.on_component(&ctx, component).await;
            }
            Interaction::Component(component) => {
                debug!(custom_id = %component.data.custom_id, "Ignoring foreign component");
            }
            _ => {}
        }
    }
}
