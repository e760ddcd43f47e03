//! Message routing between private chats and the moderator chat.
//!
//! Correlation state lives only in the moderator chat history: every forwarded
//! question is followed by a `USER_ID:<id>` marker message reply-linked to it,
//! and a moderator reply is routed by resolving the message it points at.

use std::sync::Arc;

use tracing::warn;

use crate::{
    audit::{AuditEvent, AuditLogger},
    config::Config,
    domain::{ChatId, MessageId},
    messaging::{
        port::MessagingPort,
        types::{ChatKind, IncomingMessage},
    },
};

mod inbound;
mod reply;

#[cfg(test)]
mod fake;

pub use inbound::InboundOutcome;
pub use reply::{AnswerKind, ReplyOutcome};

pub const GREETING: &str = "Hi, send me your question (text or media). Moderators will answer.";
pub const QUESTION_ACK: &str =
    "Your question has been sent to moderators. You will get an answer here.";
pub const QUESTION_FAILED: &str = "Failed to send your question. Please try again later.";
pub const ANSWER_PREFIX: &str = "Answer from moderator:\n\n";
pub const ANSWER_DELIVERED: &str = "Answer delivered to user.";
pub const TARGET_UNRESOLVED: &str = "Could not determine target user id. Make sure you reply to the forwarded message or the metadata message.";
pub const TARGET_MALFORMED: &str =
    "Found a USER_ID marker but it is not a valid user id. Reply to the forwarded message instead.";
pub const USER_UNREACHABLE: &str = "Failed to deliver the answer to the user. They may have blocked the bot or changed privacy settings.";
pub const DELIVERY_FAILED: &str = "Failed to deliver the answer to the user. Please try again later.";

/// Which handler an incoming message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Reply inside the moderator chat.
    Reply,
    /// `/start` in a private chat.
    Greeting,
    /// Question from a human in a private chat.
    Inbound,
    Ignore,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Ignored,
    Greeted,
    Inbound(InboundOutcome),
    Reply(ReplyOutcome),
}

/// Stateless router shared by all concurrent update handlers.
#[derive(Clone)]
pub struct Relay {
    moderator_chat: ChatId,
    transport: Arc<dyn MessagingPort>,
    audit: Option<Arc<AuditLogger>>,
}

impl Relay {
    pub fn new(moderator_chat: ChatId, transport: Arc<dyn MessagingPort>) -> Self {
        Self {
            moderator_chat,
            transport,
            audit: None,
        }
    }

    pub fn from_config(cfg: &Config, transport: Arc<dyn MessagingPort>) -> Self {
        let relay = Self::new(cfg.moderator_chat_id, transport);
        match &cfg.audit_log_path {
            Some(path) => relay.with_audit(AuditLogger::new(path.clone(), cfg.audit_log_json)),
            None => relay,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    pub fn route(&self, msg: &IncomingMessage) -> Route {
        if msg.chat_id == self.moderator_chat {
            return if msg.reply_to.is_some() {
                Route::Reply
            } else {
                Route::Ignore
            };
        }

        if msg.chat_kind != ChatKind::Private {
            return Route::Ignore;
        }
        match &msg.from {
            Some(sender) if !sender.is_bot => {}
            _ => return Route::Ignore,
        }

        if msg.text.as_deref().is_some_and(is_start_command) {
            Route::Greeting
        } else {
            Route::Inbound
        }
    }

    /// Handle one update. Failures are logged, audited and reported to the
    /// relevant chat; nothing is propagated to the caller.
    pub async fn handle(&self, msg: &IncomingMessage) -> RelayOutcome {
        match self.route(msg) {
            Route::Ignore => RelayOutcome::Ignored,
            Route::Greeting => {
                self.notify(msg.chat_id, GREETING, None).await;
                RelayOutcome::Greeted
            }
            Route::Inbound => match &msg.from {
                Some(sender) => RelayOutcome::Inbound(self.relay_question(msg, sender).await),
                None => RelayOutcome::Ignored,
            },
            Route::Reply => match &msg.reply_to {
                Some(quoted) => RelayOutcome::Reply(self.route_answer(msg, quoted).await),
                None => RelayOutcome::Ignored,
            },
        }
    }

    /// Best-effort notification; a failure here is only logged.
    async fn notify(&self, chat_id: ChatId, text: &str, reply_to: Option<MessageId>) {
        if let Err(e) = self.transport.send_text(chat_id, text, reply_to).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send notification");
        }
    }

    fn audit(&self, event: AuditEvent) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(e) = audit.write(event) {
            warn!(path = %audit.path().display(), error = %e, "audit write failed");
        }
    }
}

/// `/start`, `/start@bot_name`, optionally followed by a deep-link payload.
fn is_start_command(text: &str) -> bool {
    let Some(cmd) = text.split_whitespace().next() else {
        return false;
    };
    cmd == "/start" || cmd.starts_with("/start@")
}
