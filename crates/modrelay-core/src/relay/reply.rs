use tracing::{error, info, warn};

use crate::{
    audit::AuditEvent,
    domain::{ChatId, UserId},
    identity::{resolve, Resolution},
    messaging::types::{IncomingMessage, QuotedMessage},
};

use super::{
    Relay, ANSWER_DELIVERED, ANSWER_PREFIX, DELIVERY_FAILED, TARGET_MALFORMED, TARGET_UNRESOLVED,
    USER_UNREACHABLE,
};

/// How a moderator answer reaches the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
    /// Prefixed text message.
    Text,
    /// Content copy sent by the bot, hiding the moderator.
    Copy,
}

impl AnswerKind {
    fn as_str(self) -> &'static str {
        match self {
            AnswerKind::Text => "text",
            AnswerKind::Copy => "copy",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    Delivered { user: UserId, kind: AnswerKind },
    /// No identity in the replied-to message; nothing was delivered.
    Unresolved,
    /// A marker was present but unparseable; nothing was delivered.
    Malformed,
    DeliveryFailed { user: UserId, unreachable: bool },
}

impl Relay {
    pub(super) async fn route_answer(
        &self,
        msg: &IncomingMessage,
        quoted: &QuotedMessage,
    ) -> ReplyOutcome {
        let user = match resolve(quoted) {
            Resolution::Resolved { user, source } => {
                info!(
                    user_id = user.0,
                    source = ?source,
                    anchor = quoted.message_id.0,
                    "resolved answer target"
                );
                user
            }
            Resolution::Malformed => {
                warn!(anchor = quoted.message_id.0, "reply target has a malformed marker");
                self.audit(AuditEvent::routing_failed(msg.message_id.0, "malformed marker"));
                self.notify(self.moderator_chat, TARGET_MALFORMED, Some(msg.message_id))
                    .await;
                return ReplyOutcome::Malformed;
            }
            Resolution::Unresolved => {
                warn!(anchor = quoted.message_id.0, "could not determine target user id");
                self.audit(AuditEvent::routing_failed(msg.message_id.0, "unresolved"));
                self.notify(self.moderator_chat, TARGET_UNRESOLVED, Some(msg.message_id))
                    .await;
                return ReplyOutcome::Unresolved;
            }
        };

        let target = ChatId::from(user);
        let (kind, delivery) = match msg.text.as_deref() {
            Some(text) => (
                AnswerKind::Text,
                self.transport
                    .send_text(target, &format!("{ANSWER_PREFIX}{text}"), None)
                    .await,
            ),
            None => (
                AnswerKind::Copy,
                self.transport.copy_message(target, msg.message_ref()).await,
            ),
        };

        match delivery {
            Ok(_) => {
                info!(user_id = user.0, kind = kind.as_str(), "answer delivered");
                self.audit(AuditEvent::answer_delivered(
                    user.0,
                    kind.as_str(),
                    msg.text.as_deref().or(msg.caption.as_deref()),
                    msg.message_id.0,
                ));
                self.notify(self.moderator_chat, ANSWER_DELIVERED, Some(msg.message_id))
                    .await;
                ReplyOutcome::Delivered { user, kind }
            }
            Err(e) => {
                let unreachable = e.is_unreachable();
                error!(user_id = user.0, unreachable, error = %e, "failed to deliver moderator answer");
                self.audit(AuditEvent::delivery_failed(
                    user.0,
                    msg.message_id.0,
                    &e.to_string(),
                ));
                let notice = if unreachable {
                    USER_UNREACHABLE
                } else {
                    DELIVERY_FAILED
                };
                self.notify(self.moderator_chat, notice, Some(msg.message_id))
                    .await;
                ReplyOutcome::DeliveryFailed { user, unreachable }
            }
        }
    }
}
