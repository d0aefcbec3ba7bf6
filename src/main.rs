mod config;
mod platform;
mod responder;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::responder::Responder;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,group_responder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  Target users: {:?}", config.target_user_ids);
    info!("  Reply message: {} chars", config.reply_message.chars().count());
    if !config.rejected_user_ids.is_empty() {
        warn!(
            "Skipped invalid entries in TARGET_USER_IDS: {:?}",
            config.rejected_user_ids
        );
    }
    if config.target_user_ids.is_empty() {
        warn!("No target users configured; the bot will never reply");
    }

    let responder = Arc::new(Responder::new(Arc::new(config)));
    let bot = teloxide::Bot::new(&responder.config().bot_token);

    info!("Bot is starting...");
    platform::telegram::run(responder, bot).await?;

    Ok(())
}
