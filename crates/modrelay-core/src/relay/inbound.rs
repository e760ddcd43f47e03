use tracing::{error, info};

use crate::{
    audit::AuditEvent,
    domain::MessageRef,
    identity::encode_marker,
    messaging::types::{IncomingMessage, Sender},
};

use super::{Relay, QUESTION_ACK, QUESTION_FAILED};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Question forwarded and anchored by a marker message.
    Forwarded {
        forwarded: MessageRef,
        anchor: MessageRef,
    },
    ForwardFailed,
    /// The forward landed but its marker could not be posted; the forwarded
    /// copy stays in the moderator chat without an anchor.
    AnnotationFailed { forwarded: MessageRef },
}

impl Relay {
    pub(super) async fn relay_question(
        &self,
        msg: &IncomingMessage,
        sender: &Sender,
    ) -> InboundOutcome {
        let label = sender.label();

        let forwarded = match self
            .transport
            .forward_message(self.moderator_chat, msg.message_ref())
            .await
        {
            Ok(m) => m,
            Err(e) => {
                error!(user_id = sender.id.0, error = %e, "error forwarding to moderators");
                self.audit(AuditEvent::forward_failed(
                    sender.id.0,
                    &label,
                    &e.to_string(),
                    "forward",
                ));
                self.notify(msg.chat_id, QUESTION_FAILED, None).await;
                return InboundOutcome::ForwardFailed;
            }
        };

        let marker = encode_marker(sender.id, &label);
        let anchor = match self
            .transport
            .send_text(self.moderator_chat, &marker, Some(forwarded.message_id))
            .await
        {
            Ok(m) => m,
            Err(e) => {
                error!(
                    user_id = sender.id.0,
                    forwarded = forwarded.message_id.0,
                    error = %e,
                    "error posting user marker; forwarded message left without anchor"
                );
                self.audit(AuditEvent::forward_failed(
                    sender.id.0,
                    &label,
                    &e.to_string(),
                    "marker",
                ));
                self.notify(msg.chat_id, QUESTION_FAILED, None).await;
                return InboundOutcome::AnnotationFailed { forwarded };
            }
        };

        info!(
            user_id = sender.id.0,
            forwarded = forwarded.message_id.0,
            anchor = anchor.message_id.0,
            "question forwarded to moderators"
        );
        self.audit(AuditEvent::question_forwarded(
            sender.id.0,
            &label,
            msg.text.as_deref().or(msg.caption.as_deref()),
            anchor.message_id.0,
        ));

        self.notify(msg.chat_id, QUESTION_ACK, None).await;

        InboundOutcome::Forwarded { forwarded, anchor }
    }
}
