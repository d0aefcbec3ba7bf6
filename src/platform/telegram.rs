use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use teloxide::update_listeners;
use tracing::{debug, info};

use crate::platform::{IncomingMessage, ReplySender};
use crate::responder::Responder;

/// How often a pending shutdown is retried while the dispatcher is still starting up.
const SHUTDOWN_RETRY: Duration = Duration::from_millis(50);

/// Build a platform-agnostic message from a Telegram message
pub fn incoming_from_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        sender_user_id: msg.from.as_ref().map(|user| user.id.0),
        chat_id: msg.chat.id.0,
        chat_is_group: is_group_chat(msg),
        is_text: msg.text().is_some(),
        message_id: msg.id.0,
    }
}

fn is_group_chat(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

/// Dispatcher filter: text messages in group or supergroup chats
fn is_group_text(msg: &Message) -> bool {
    is_group_chat(msg) && msg.text().is_some()
}

/// Sends threaded replies through the Bot API
pub struct TelegramReplySender {
    bot: Bot,
}

impl TelegramReplySender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySender for TelegramReplySender {
    async fn send_reply(&self, chat_id: i64, text: &str, reply_to: i32) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_parameters(ReplyParameters::new(MessageId(reply_to)))
            .await
            .with_context(|| {
                format!(
                    "Failed to send reply to message {} in chat {}",
                    reply_to, chat_id
                )
            })?;
        Ok(())
    }
}

/// Run the Telegram bot platform until Ctrl+C or SIGTERM
pub async fn run(responder: Arc<Responder>, bot: Bot) -> Result<()> {
    info!("Starting Telegram platform...");

    // Installed before any network call so a SIGTERM during startup is never lost.
    let terminate = terminate_signal()?;

    let handler = Update::filter_message()
        .filter(|msg: Message| is_group_text(&msg))
        .endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![responder])
        .default_handler(|upd| async move {
            debug!("Ignored update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build();

    let token = dispatcher.shutdown_token();
    let signal_task = tokio::spawn(async move {
        terminate.await;
        info!("Termination signal received, shutting down...");
        shutdown_when_running(|| token.shutdown().ok()).await;
    });

    let listener = update_listeners::polling_default(bot).await;
    let result = dispatcher
        .try_dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    signal_task.abort();
    result.context("Failed to start the bot; check that BOT_TOKEN is valid")?;

    info!("Telegram platform stopped");
    Ok(())
}

/// Keep asking the dispatcher to stop until it accepts, then wait for in-flight handlers.
/// `try_shutdown` yields `None` while the dispatcher has not started dispatching yet.
async fn shutdown_when_running<F, Fut>(mut try_shutdown: F)
where
    F: FnMut() -> Option<Fut>,
    Fut: Future<Output = ()>,
{
    loop {
        if let Some(done) = try_shutdown() {
            done.await;
            return;
        }
        debug!("Dispatcher not running yet, retrying shutdown");
        tokio::time::sleep(SHUTDOWN_RETRY).await;
    }
}

async fn handle_message(bot: Bot, msg: Message, responder: Arc<Responder>) -> ResponseResult<()> {
    let incoming = incoming_from_message(&msg);
    let sender = TelegramReplySender::new(bot);

    // Per-message failures are logged inside the responder and never reach the dispatcher.
    responder.handle(Some(&incoming), &sender).await;

    Ok(())
}

#[cfg(unix)]
fn terminate_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to listen for SIGTERM")?;
    Ok(async move {
        sigterm.recv().await;
    })
}

#[cfg(not(unix))]
fn terminate_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    // Ctrl+C is handled by the dispatcher itself.
    Ok(std::future::pending::<()>())
}
