//! Liveness endpoint for hosting platforms that expect a web service.
//!
//! One route, no state, no auth: `GET /` answers whether or not the
//! gateway connection is up, so platform health probes keep the process
//! alive even while Discord is unreachable.

use axum::{routing::get, Router};
use tracing::{info, warn};

pub const LIVENESS_BODY: &str = "Bot is alive!";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_BODY }))
}

/// Binds and serves on a background task. A failed bind is logged and
/// swallowed: losing liveness probes must not stop the bot from starting.
pub async fn spawn(bind_address: &str, port: u16) {
    let address = format!("{bind_address}:{port}");

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            warn!(bind_address = %address, error = %error, "liveness endpoint failed to bind");
            return;
        }
    };

    info!(bind_address = %address, "liveness endpoint started");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router()).await {
            warn!(error = %error, "liveness endpoint terminated unexpectedly");
        }
    });
}
