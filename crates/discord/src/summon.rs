//! The confirm-time summon flow.
//!
//! Resolves the announcement channel, posts the formatted announcement and
//! reduces whatever happened to a [`SummonOutcome`]. Every outcome maps to
//! one ephemeral reply for the invoking user; nothing here is ever posted
//! to a shared channel except the announcement itself.

use tracing::warn;

use beckon_core::announce::{format_announcement, UserRef};

use crate::gateway::{AnnouncePort, GatewayError, GuildRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummonOutcome {
    Sent { notified: usize },
    EmptySelection,
    ChannelMissing { name: String },
    PermissionDenied,
    SendFailed,
}

pub struct SummonFlow {
    announce_channel: String,
}

impl SummonFlow {
    pub fn new(announce_channel: impl Into<String>) -> Self {
        Self { announce_channel: announce_channel.into() }
    }

    pub async fn confirm(
        &self,
        port: &dyn AnnouncePort,
        guild: &GuildRef,
        invoker: UserRef,
        selected: &[UserRef],
    ) -> SummonOutcome {
        if selected.is_empty() {
            return SummonOutcome::EmptySelection;
        }

        let channel = match port.find_text_channel(guild, &self.announce_channel).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                return SummonOutcome::ChannelMissing { name: self.announce_channel.clone() }
            }
            Err(error) => {
                warn!(guild = %guild.name, error = %error, "announce channel lookup failed");
                return SummonOutcome::SendFailed;
            }
        };

        let text = format_announcement(selected, invoker);
        match port.send_announcement(&channel, &text).await {
            Ok(()) => SummonOutcome::Sent { notified: selected.len() },
            Err(GatewayError::PermissionDenied(detail)) => {
                warn!(guild = %guild.name, error = %detail, "announcement send denied");
                SummonOutcome::PermissionDenied
            }
            Err(error) => {
                warn!(guild = %guild.name, error = %error, "announcement send failed");
                SummonOutcome::SendFailed
            }
        }
    }
}

/// The ephemeral reply shown to the invoking user for each outcome.
pub fn ephemeral_reply(outcome: &SummonOutcome) -> String {
    match outcome {
        SummonOutcome::Sent { notified } => format!("Sent a summon to {notified} member(s)."),
        SummonOutcome::EmptySelection => "No members selected.".to_owned(),
        SummonOutcome::ChannelMissing { name } => {
            format!("Error: channel `{name}` was not found.")
        }
        SummonOutcome::PermissionDenied => {
            "Error: no permission to post in the announcement channel.".to_owned()
        }
        SummonOutcome::SendFailed => "Error: the summon could not be sent.".to_owned(),
    }
}
