use crate::domain::{ChatId, MessageId, MessageRef, UserId};

/// Kind of conversation an update arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// Author of an incoming message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl Sender {
    /// Display label shown to moderators: `@handle`, else first name, else empty.
    pub fn label(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{username}");
        }
        self.first_name.clone().unwrap_or_default()
    }
}

/// The message a moderator replied to, as far as the relay needs to see it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuotedMessage {
    pub message_id: MessageId,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Platform "forwarded from user X" metadata, missing when X hides it.
    pub forward_from: Option<UserId>,
}

/// Cross-transport incoming message model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    pub message_id: MessageId,
    pub from: Option<Sender>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to: Option<QuotedMessage>,
    /// Kept so the model matches the inbound event shape; routing only reads
    /// the origin of the replied-to message (`QuotedMessage::forward_from`).
    pub forward_from: Option<UserId>,
}

impl IncomingMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }

    /// Plain text message. Captioned media is not text.
    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}
