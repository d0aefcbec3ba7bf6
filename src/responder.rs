use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::platform::{IncomingMessage, ReplySender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoMessage,
    NoSender,
    NotGroupChat,
    NotText,
    NotTarget,
}

/// What the responder did with one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replied,
    Ignored(IgnoreReason),
    /// The reply could not be sent; already logged.
    SendFailed,
}

/// Replies with the configured text to messages from target users in group chats.
/// Holds no state besides the read-only config.
pub struct Responder {
    config: Arc<Config>,
}

impl Responder {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check<'a>(
        &self,
        message: Option<&'a IncomingMessage>,
    ) -> Result<(&'a IncomingMessage, u64), IgnoreReason> {
        let message = message.ok_or(IgnoreReason::NoMessage)?;
        let user_id = message.sender_user_id.ok_or(IgnoreReason::NoSender)?;

        if !message.chat_is_group {
            return Err(IgnoreReason::NotGroupChat);
        }
        if !message.is_text {
            return Err(IgnoreReason::NotText);
        }
        if !self.config.is_target(user_id) {
            return Err(IgnoreReason::NotTarget);
        }

        Ok((message, user_id))
    }

    /// Handle one inbound message. Never fails: send errors are logged and swallowed.
    pub async fn handle(
        &self,
        message: Option<&IncomingMessage>,
        sender: &dyn ReplySender,
    ) -> Outcome {
        let (message, user_id) = match self.check(message) {
            Ok(eligible) => eligible,
            Err(reason) => {
                debug!("Ignoring message: {:?}", reason);
                return Outcome::Ignored(reason);
            }
        };

        match sender
            .send_reply(message.chat_id, &self.config.reply_message, message.message_id)
            .await
        {
            Ok(()) => {
                info!("Replied to user {}", user_id);
                Outcome::Replied
            }
            Err(e) => {
                error!("Error replying to user {}: {:#}", user_id, e);
                Outcome::SendFailed
            }
        }
    }
}
