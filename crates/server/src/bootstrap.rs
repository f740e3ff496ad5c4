use thiserror::Error;
use tracing::info;

use beckon_core::config::{AppConfig, ConfigError, LoadOptions};
use beckon_discord::{build_client, Client, ClientError};

pub struct Application {
    pub config: AppConfig,
    pub client: Client,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("discord client construction failed: {0}")]
    Client(#[source] ClientError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let client = build_client(&config).await.map_err(BootstrapError::Client)?;
    info!(
        button_channel = %config.channels.button_channel,
        announce_channel = %config.channels.announce_channel,
        "discord client constructed"
    );

    Ok(Application { config, client })
}

#[cfg(test)]
mod tests {
    use beckon_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_without_a_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                discord_token: Some(String::new()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("discord.token"));
    }
}
