mod bootstrap;
mod liveness;

use anyhow::Result;
use beckon_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use beckon_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // A missing token fails here, before any connection attempt is made.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let mut app = bootstrap::bootstrap_with_config(config).await?;

    // Liveness runs on its own task; a failed bind is logged inside spawn
    // and never blocks the gateway connection.
    liveness::spawn(&app.config.server.bind_address, app.config.server.port).await;

    tracing::info!("beckon connecting to the Discord gateway");

    tokio::select! {
        result = app.client.start() => {
            // No retry: a fatal client error ends the process after one log line.
            if let Err(error) = result {
                tracing::error!(error = %error, "discord client terminated");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("beckon stopping");
        }
    }

    Ok(())
}
