use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    Result,
};

/// Transport port the relay calls into.
///
/// Each call either succeeds with a reference to the message it produced or
/// fails with a core [`crate::Error`]. Implementations should report recipients
/// that cannot be reached as [`crate::Error::Unreachable`].
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Forward `source` verbatim into `to`, keeping media and origin metadata.
    async fn forward_message(&self, to: ChatId, source: MessageRef) -> Result<MessageRef>;

    async fn send_text(
        &self,
        to: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef>;

    /// Duplicate the content of `source` into `to` as a message sent by the bot.
    async fn copy_message(&self, to: ChatId, source: MessageRef) -> Result<MessageRef>;
}
