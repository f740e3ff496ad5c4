//! Startup reconciliation of the persistent summon button.
//!
//! Runs once per connection: for every joined guild, make sure the button
//! channel holds a bot-authored message with components, posting one when
//! it does not. Each guild is processed independently; any failure is
//! logged with the guild name and never aborts the remaining guilds.

use tracing::{info, warn};

use beckon_core::reconcile::{decide, ReconcileAction, HISTORY_SCAN_LIMIT};

use crate::gateway::{GatewayError, GuildGateway, GuildRef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub posted: usize,
    pub already_present: usize,
    pub missing_channel: usize,
    pub failed: usize,
}

pub struct Reconciler {
    button_channel: String,
}

impl Reconciler {
    pub fn new(button_channel: impl Into<String>) -> Self {
        Self { button_channel: button_channel.into() }
    }

    pub async fn run(&self, gateway: &dyn GuildGateway) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        let guilds = match gateway.joined_guilds().await {
            Ok(guilds) => guilds,
            Err(error) => {
                warn!(error = %error, "could not list joined guilds; skipping reconciliation");
                summary.failed += 1;
                return summary;
            }
        };

        for guild in &guilds {
            match self.reconcile_guild(gateway, guild).await {
                Ok(ReconcileOutcome::Posted) => {
                    info!(guild = %guild.name, "summon button posted");
                    summary.posted += 1;
                }
                Ok(ReconcileOutcome::AlreadyPresent) => {
                    info!(guild = %guild.name, "summon button already present");
                    summary.already_present += 1;
                }
                Ok(ReconcileOutcome::MissingChannel) => {
                    info!(
                        guild = %guild.name,
                        channel = %self.button_channel,
                        "button channel not found; skipping guild"
                    );
                    summary.missing_channel += 1;
                }
                Err(GatewayError::PermissionDenied(detail)) => {
                    warn!(guild = %guild.name, error = %detail, "insufficient permission");
                    summary.failed += 1;
                }
                Err(error) => {
                    warn!(guild = %guild.name, error = %error, "guild reconciliation failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            guilds = guilds.len(),
            posted = summary.posted,
            already_present = summary.already_present,
            missing_channel = summary.missing_channel,
            failed = summary.failed,
            "summon button reconciliation finished"
        );
        summary
    }

    async fn reconcile_guild(
        &self,
        gateway: &dyn GuildGateway,
        guild: &GuildRef,
    ) -> Result<ReconcileOutcome, GatewayError> {
        let Some(channel) = gateway.find_text_channel(guild, &self.button_channel).await? else {
            return Ok(ReconcileOutcome::MissingChannel);
        };

        let recent = gateway.recent_messages(&channel, HISTORY_SCAN_LIMIT).await?;
        match decide(&recent) {
            ReconcileAction::LeaveAlone => Ok(ReconcileOutcome::AlreadyPresent),
            ReconcileAction::PostButton => {
                gateway.post_button_message(&channel).await?;
                Ok(ReconcileOutcome::Posted)
            }
        }
    }
}

enum ReconcileOutcome {
    Posted,
    AlreadyPresent,
    MissingChannel,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use beckon_core::reconcile::ScannedMessage;

    use super::{ReconcileSummary, Reconciler};
    use crate::gateway::{ChannelRef, GatewayError, GuildGateway, GuildRef};

    struct ScriptedGuild {
        guild: GuildRef,
        bot_channel: Option<ChannelRef>,
        history: Result<Vec<ScannedMessage>, GatewayError>,
        post_result: Result<(), GatewayError>,
    }

    #[derive(Default)]
    struct ScriptedGateway {
        guilds: Vec<ScriptedGuild>,
        posts: Mutex<Vec<u64>>,
    }

    impl ScriptedGateway {
        fn with_guilds(guilds: Vec<ScriptedGuild>) -> Self {
            Self { guilds, posts: Mutex::new(Vec::new()) }
        }

        async fn posted_channels(&self) -> Vec<u64> {
            self.posts.lock().await.clone()
        }

        fn scripted(&self, guild: &GuildRef) -> &ScriptedGuild {
            self.guilds
                .iter()
                .find(|scripted| scripted.guild.id == guild.id)
                .expect("guild is scripted")
        }
    }

    #[async_trait]
    impl GuildGateway for ScriptedGateway {
        async fn joined_guilds(&self) -> Result<Vec<GuildRef>, GatewayError> {
            Ok(self.guilds.iter().map(|scripted| scripted.guild.clone()).collect())
        }

        async fn find_text_channel(
            &self,
            guild: &GuildRef,
            name: &str,
        ) -> Result<Option<ChannelRef>, GatewayError> {
            assert_eq!(name, "bot");
            Ok(self.scripted(guild).bot_channel.clone())
        }

        async fn recent_messages(
            &self,
            channel: &ChannelRef,
            limit: u8,
        ) -> Result<Vec<ScannedMessage>, GatewayError> {
            assert_eq!(limit, 10);
            let scripted = self
                .guilds
                .iter()
                .find(|scripted| {
                    scripted.bot_channel.as_ref().is_some_and(|c| c.id == channel.id)
                })
                .expect("channel is scripted");
            scripted.history.clone()
        }

        async fn post_button_message(&self, channel: &ChannelRef) -> Result<(), GatewayError> {
            let scripted = self
                .guilds
                .iter()
                .find(|scripted| {
                    scripted.bot_channel.as_ref().is_some_and(|c| c.id == channel.id)
                })
                .expect("channel is scripted");
            scripted.post_result.clone()?;
            self.posts.lock().await.push(channel.id);
            Ok(())
        }
    }

    fn guild(id: u64, name: &str) -> GuildRef {
        GuildRef { id, name: name.to_owned() }
    }

    fn channel(id: u64) -> ChannelRef {
        ChannelRef { id, name: "bot".to_owned() }
    }

    fn bot_button_message() -> ScannedMessage {
        ScannedMessage { authored_by_bot: true, has_components: true }
    }

    fn plain_message() -> ScannedMessage {
        ScannedMessage { authored_by_bot: false, has_components: false }
    }

    #[tokio::test]
    async fn posts_exactly_one_button_where_none_exists() {
        let gateway = ScriptedGateway::with_guilds(vec![ScriptedGuild {
            guild: guild(1, "alpha"),
            bot_channel: Some(channel(11)),
            history: Ok(vec![plain_message(), plain_message()]),
            post_result: Ok(()),
        }]);

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(summary, ReconcileSummary { posted: 1, ..ReconcileSummary::default() });
        assert_eq!(gateway.posted_channels().await, vec![11]);
    }

    #[tokio::test]
    async fn leaves_existing_buttons_alone() {
        let gateway = ScriptedGateway::with_guilds(vec![ScriptedGuild {
            guild: guild(1, "alpha"),
            bot_channel: Some(channel(11)),
            history: Ok(vec![plain_message(), bot_button_message()]),
            post_result: Ok(()),
        }]);

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(
            summary,
            ReconcileSummary { already_present: 1, ..ReconcileSummary::default() }
        );
        assert!(gateway.posted_channels().await.is_empty());
    }

    #[tokio::test]
    async fn missing_channel_skips_the_guild_without_failing_others() {
        let gateway = ScriptedGateway::with_guilds(vec![
            ScriptedGuild {
                guild: guild(1, "no-bot-channel"),
                bot_channel: None,
                history: Ok(vec![]),
                post_result: Ok(()),
            },
            ScriptedGuild {
                guild: guild(2, "beta"),
                bot_channel: Some(channel(22)),
                history: Ok(vec![]),
                post_result: Ok(()),
            },
        ]);

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(
            summary,
            ReconcileSummary { posted: 1, missing_channel: 1, ..ReconcileSummary::default() }
        );
        assert_eq!(gateway.posted_channels().await, vec![22]);
    }

    #[tokio::test]
    async fn permission_failure_in_one_guild_does_not_abort_the_rest() {
        let gateway = ScriptedGateway::with_guilds(vec![
            ScriptedGuild {
                guild: guild(1, "locked-down"),
                bot_channel: Some(channel(11)),
                history: Err(GatewayError::PermissionDenied("cannot read history".to_owned())),
                post_result: Ok(()),
            },
            ScriptedGuild {
                guild: guild(2, "beta"),
                bot_channel: Some(channel(22)),
                history: Ok(vec![plain_message()]),
                post_result: Ok(()),
            },
        ]);

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(
            summary,
            ReconcileSummary { posted: 1, failed: 1, ..ReconcileSummary::default() }
        );
        assert_eq!(gateway.posted_channels().await, vec![22]);
    }

    #[tokio::test]
    async fn unexpected_post_failure_is_counted_not_propagated() {
        let gateway = ScriptedGateway::with_guilds(vec![ScriptedGuild {
            guild: guild(1, "flaky"),
            bot_channel: Some(channel(11)),
            history: Ok(vec![]),
            post_result: Err(GatewayError::Platform("rate limited".to_owned())),
        }]);

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(summary, ReconcileSummary { failed: 1, ..ReconcileSummary::default() });
        assert!(gateway.posted_channels().await.is_empty());
    }

    #[tokio::test]
    async fn a_mixed_fleet_is_fully_processed() {
        let histories: HashMap<u64, Vec<ScannedMessage>> = HashMap::from([
            (11, vec![]),
            (22, vec![bot_button_message()]),
            (33, vec![plain_message()]),
        ]);

        let gateway = ScriptedGateway::with_guilds(
            histories
                .iter()
                .map(|(channel_id, history)| ScriptedGuild {
                    guild: guild(*channel_id / 11, "guild"),
                    bot_channel: Some(channel(*channel_id)),
                    history: Ok(history.clone()),
                    post_result: Ok(()),
                })
                .collect(),
        );

        let summary = Reconciler::new("bot").run(&gateway).await;

        assert_eq!(summary.posted, 2);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.failed, 0);
    }
}
