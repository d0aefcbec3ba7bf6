pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Sender's user ID; absent for channel posts and anonymous admins
    pub sender_user_id: Option<u64>,
    pub chat_id: i64,
    /// True for group and supergroup chats
    pub chat_is_group: bool,
    pub is_text: bool,
    /// ID the reply is threaded to
    pub message_id: i32,
}

/// Outbound side of the platform: send `text` into `chat_id` as a reply to `reply_to`.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, chat_id: i64, text: &str, reply_to: i32) -> Result<()>;
}
