//! Issue Relay web server.
//!
//! This binary:
//! - Receives GitHub `issues` webhooks
//! - Verifies their HMAC-SHA256 signature
//! - Opens a Discord forum thread for every newly opened issue
//!
//! Configuration is read from the environment once at startup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use issue_relay::{shutdown::shutdown_signal, web, AppState, Config, DiscordClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!(
        port = config.port,
        webhook_secret_configured = config.github_webhook_secret.is_some(),
        bot_token_configured = config.discord_bot_token.is_some(),
        forum_channel_id = ?config.discord_forum_channel_id,
        discord_api_base = %config.discord_api_base,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    // Missing settings fail each request with a config error rather than
    // stopping the server.
    if let Err(e) = config.credentials() {
        warn!(error = %e, "config_incomplete");
    }

    let discord = DiscordClient::new(config.discord_api_base.clone(), config.request_timeout())
        .context("Failed to build Discord client")?;

    let state = AppState::new(config.clone(), Arc::new(discord));
    let app = web::router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}
