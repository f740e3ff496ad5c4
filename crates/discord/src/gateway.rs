//! The seam between the flows and the Discord API.
//!
//! The reconciler and the summon flow only talk to these traits. The real
//! implementation (`handler::SerenityGateway`) forwards to `serenity::http`;
//! tests substitute scripted fakes.

use async_trait::async_trait;
use thiserror::Error;

use beckon_core::reconcile::ScannedMessage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildRef {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The platform refused the call with a permission error (HTTP 403).
    #[error("missing permission: {0}")]
    PermissionDenied(String),
    #[error("gateway call failed: {0}")]
    Platform(String),
}

/// Guild-scoped operations the startup reconciler needs.
#[async_trait]
pub trait GuildGateway: Send + Sync {
    async fn joined_guilds(&self) -> Result<Vec<GuildRef>, GatewayError>;

    /// Exact, case-sensitive name match over the guild's text channels. All
    /// name-based resolution funnels through here so it can be swapped for
    /// id-based lookup without touching callers.
    async fn find_text_channel(
        &self,
        guild: &GuildRef,
        name: &str,
    ) -> Result<Option<ChannelRef>, GatewayError>;

    /// The most recent `limit` messages, reduced to what the scan inspects.
    async fn recent_messages(
        &self,
        channel: &ChannelRef,
        limit: u8,
    ) -> Result<Vec<ScannedMessage>, GatewayError>;

    /// Posts the descriptive text plus the persistent summon button.
    async fn post_button_message(&self, channel: &ChannelRef) -> Result<(), GatewayError>;
}

/// Announcement-channel operations the confirm flow needs.
#[async_trait]
pub trait AnnouncePort: Send + Sync {
    async fn find_text_channel(
        &self,
        guild: &GuildRef,
        name: &str,
    ) -> Result<Option<ChannelRef>, GatewayError>;

    async fn send_announcement(
        &self,
        channel: &ChannelRef,
        text: &str,
    ) -> Result<(), GatewayError>;
}
