//! Serenity event handler and the real gateway implementation.
//!
//! `SummonBot` is the application context: constructed once at startup,
//! handed to serenity as the event handler, and owner of the per-picker
//! session state. All platform interaction runs on serenity's single
//! gateway event loop; the handlers only suspend on network calls.

use std::sync::Arc;
use std::time::Instant;

use secrecy::ExposeSecret;
use serenity::all::{
    ChannelId, ChannelType, Client, ComponentInteraction, ComponentInteractionDataKind, Context,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, EventHandler,
    GatewayIntents, GetMessages, GuildId, Http, Interaction, Ready, UserId,
};
use async_trait::async_trait;
use serenity::http::HttpError;
use tokio::sync::Mutex;
use tracing::{info, warn};

use beckon_core::announce::UserRef;
use beckon_core::config::{AppConfig, ChannelsConfig};
use beckon_core::picker::{PickerError, SessionStore};
use beckon_core::reconcile::ScannedMessage;

use crate::components::{self, ComponentAction, BUTTON_MESSAGE_TEXT, PICKER_INTRO_TEXT};
use crate::gateway::{AnnouncePort, ChannelRef, GatewayError, GuildGateway, GuildRef};
use crate::reconciler::Reconciler;
use crate::summon::{ephemeral_reply, SummonFlow, SummonOutcome};

pub struct SummonBot {
    channels: ChannelsConfig,
    sessions: Mutex<SessionStore>,
}

impl SummonBot {
    pub fn new(channels: ChannelsConfig) -> Self {
        Self { channels, sessions: Mutex::new(SessionStore::new()) }
    }

    async fn open_picker(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
    ) -> serenity::Result<()> {
        component
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(PICKER_INTRO_TEXT)
                        .components(components::picker_rows())
                        .ephemeral(true),
                ),
            )
            .await?;

        let picker_message = component.get_response(&ctx.http).await?;
        self.sessions.lock().await.open(
            picker_message.id.get(),
            UserRef::new(component.user.id.get()),
            Instant::now(),
        );
        Ok(())
    }

    async fn record_selection(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
    ) -> serenity::Result<()> {
        let selected: Vec<UserRef> = match &component.data.kind {
            ComponentInteractionDataKind::UserSelect { values } => {
                values.iter().map(|id| UserRef::new(id.get())).collect()
            }
            _ => return Ok(()),
        };

        // Deferred acknowledgment: no visible message for selection changes.
        component.create_response(&ctx.http, CreateInteractionResponse::Acknowledge).await?;

        self.sessions.lock().await.record_selection(
            component.message.id.get(),
            selected,
            Instant::now(),
        );
        Ok(())
    }

    async fn confirm_summon(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
    ) -> serenity::Result<()> {
        let confirmed = self
            .sessions
            .lock()
            .await
            .take_confirmed(component.message.id.get(), Instant::now());

        let (invoker, selected) = match confirmed {
            Ok(Some(confirmed)) => confirmed,
            Ok(None) => {
                // Unknown or expired session: the components are inert.
                return component
                    .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
                    .await;
            }
            Err(PickerError::EmptySelection | PickerError::TooManySelected) => {
                return respond_ephemeral(
                    ctx,
                    component,
                    &ephemeral_reply(&SummonOutcome::EmptySelection),
                )
                .await;
            }
        };

        let outcome = match component.guild_id {
            Some(guild_id) => {
                let gateway = SerenityGateway::new(ctx.http.clone(), ctx.cache.current_user().id);
                let guild = gateway.guild_ref(guild_id).await;
                SummonFlow::new(&self.channels.announce_channel)
                    .confirm(&gateway, &guild, invoker, &selected)
                    .await
            }
            // Button messages only ever live in guild channels.
            None => SummonOutcome::SendFailed,
        };

        respond_ephemeral(ctx, component, &ephemeral_reply(&outcome)).await
    }
}

async fn respond_ephemeral(
    ctx: &Context,
    component: &ComponentInteraction,
    content: &str,
) -> serenity::Result<()> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content(content).ephemeral(true),
            ),
        )
        .await
}

#[async_trait]
impl EventHandler for SummonBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "connected to the Discord gateway"
        );

        let gateway = SerenityGateway::with_guilds(
            ctx.http.clone(),
            ready.user.id,
            ready.guilds.iter().map(|guild| guild.id).collect(),
        );
        Reconciler::new(&self.channels.button_channel).run(&gateway).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };
        let Some(action) = components::route(&component.data.custom_id) else {
            return;
        };

        let result = match action {
            ComponentAction::OpenPicker => self.open_picker(&ctx, &component).await,
            ComponentAction::SelectionChanged => self.record_selection(&ctx, &component).await,
            ComponentAction::ConfirmSummon => self.confirm_summon(&ctx, &component).await,
        };

        if let Err(error) = result {
            warn!(
                custom_id = %component.data.custom_id,
                error = %error,
                "component interaction handling failed"
            );
        }
    }
}

/// Real gateway over `serenity::http`, constructed per event.
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_user: UserId,
    guilds: Vec<GuildId>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, bot_user: UserId) -> Self {
        Self::with_guilds(http, bot_user, Vec::new())
    }

    pub fn with_guilds(http: Arc<Http>, bot_user: UserId, guilds: Vec<GuildId>) -> Self {
        Self { http, bot_user, guilds }
    }

    /// Guild name lookup is cosmetic (log lines and errors); fall back to
    /// the id when the fetch fails rather than failing the operation.
    async fn guild_ref(&self, guild_id: GuildId) -> GuildRef {
        let name = match guild_id.to_partial_guild(&self.http).await {
            Ok(guild) => guild.name,
            Err(_) => guild_id.to_string(),
        };
        GuildRef { id: guild_id.get(), name }
    }

    async fn lookup_text_channel(
        &self,
        guild: &GuildRef,
        name: &str,
    ) -> Result<Option<ChannelRef>, GatewayError> {
        let channels =
            GuildId::new(guild.id).channels(&self.http).await.map_err(map_gateway_error)?;

        Ok(channels
            .into_values()
            .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
            .map(|channel| ChannelRef { id: channel.id.get(), name: channel.name }))
    }
}

#[async_trait]
impl GuildGateway for SerenityGateway {
    async fn joined_guilds(&self) -> Result<Vec<GuildRef>, GatewayError> {
        let mut guilds = Vec::with_capacity(self.guilds.len());
        for guild_id in &self.guilds {
            guilds.push(self.guild_ref(*guild_id).await);
        }
        Ok(guilds)
    }

    async fn find_text_channel(
        &self,
        guild: &GuildRef,
        name: &str,
    ) -> Result<Option<ChannelRef>, GatewayError> {
        self.lookup_text_channel(guild, name).await
    }

    async fn recent_messages(
        &self,
        channel: &ChannelRef,
        limit: u8,
    ) -> Result<Vec<ScannedMessage>, GatewayError> {
        let messages = ChannelId::new(channel.id)
            .messages(&self.http, GetMessages::new().limit(limit))
            .await
            .map_err(map_gateway_error)?;

        Ok(messages
            .iter()
            .map(|message| ScannedMessage {
                authored_by_bot: message.author.id == self.bot_user,
                has_components: !message.components.is_empty(),
            })
            .collect())
    }

    async fn post_button_message(&self, channel: &ChannelRef) -> Result<(), GatewayError> {
        ChannelId::new(channel.id)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(BUTTON_MESSAGE_TEXT)
                    .components(vec![components::summon_button_row()]),
            )
            .await
            .map_err(map_gateway_error)?;
        Ok(())
    }
}

#[async_trait]
impl AnnouncePort for SerenityGateway {
    async fn find_text_channel(
        &self,
        guild: &GuildRef,
        name: &str,
    ) -> Result<Option<ChannelRef>, GatewayError> {
        self.lookup_text_channel(guild, name).await
    }

    async fn send_announcement(
        &self,
        channel: &ChannelRef,
        text: &str,
    ) -> Result<(), GatewayError> {
        ChannelId::new(channel.id)
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(map_gateway_error)?;
        Ok(())
    }
}

fn map_gateway_error(error: serenity::Error) -> GatewayError {
    if is_permission_denied(&error) {
        GatewayError::PermissionDenied(error.to_string())
    } else {
        GatewayError::Platform(error.to_string())
    }
}

fn is_permission_denied(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403
    )
}

pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Builds the serenity client with the handler injected. Does not connect;
/// the caller drives `client.start()`.
pub async fn build_client(config: &AppConfig) -> serenity::Result<Client> {
    Client::builder(config.discord.token.expose_secret(), gateway_intents())
        .event_handler(SummonBot::new(config.channels.clone()))
        .await
}
