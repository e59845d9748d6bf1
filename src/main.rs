mod config;
mod dispatcher;
mod fetcher;
mod parser;
mod platform;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, TOKEN_VAR};
use crate::dispatcher::Dispatcher;
use crate::fetcher::ReqwestClient;

#[derive(Debug, Error)]
enum BootstrapError {
    #[error("required environment variable {var} is not set")]
    MissingCredential { var: &'static str },
}

/// Read the bot token through `lookup`; blank values count as missing.
fn read_token(lookup: impl Fn(&str) -> Option<String>) -> Result<String, BootstrapError> {
    lookup(TOKEN_VAR)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(BootstrapError::MissingCredential { var: TOKEN_VAR })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let token = read_token(|var| std::env::var(var).ok()).inspect_err(|e| {
        error!("CRITICAL: {}. Shutting down.", e);
    })?;
    info!("Bot token found");

    // Load configuration
    let config_path = std::env::var("CATBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("  Primary endpoint: {}", config.endpoints.primary);
    info!("  Secondary endpoint: {}", config.endpoints.secondary);
    info!("  Button: {}", config.telegram.button_label);

    let http = ReqwestClient::new(config.http.timeout())?;
    let dispatcher = Arc::new(Dispatcher::new(&config, Arc::new(http)));

    info!("Bot is starting...");
    platform::telegram::run(teloxide::Bot::new(token), dispatcher).await?;

    Ok(())
}
