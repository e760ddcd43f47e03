use std::sync::{
    atomic::{AtomicI32, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ChatKind, IncomingMessage, QuotedMessage, Sender},
    },
    Result,
};

pub const MOD_CHAT: ChatId = ChatId(-100_777);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Forward {
        to: ChatId,
        source: MessageRef,
        produced: MessageRef,
    },
    Send {
        to: ChatId,
        text: String,
        reply_to: Option<MessageId>,
        produced: MessageRef,
    },
    Copy {
        to: ChatId,
        source: MessageRef,
        produced: MessageRef,
    },
}

type FailRule = Box<dyn Fn(&Call) -> Option<Error> + Send + Sync>;

/// In-memory transport recording every attempted call.
pub struct FakeTransport {
    next_id: AtomicI32,
    calls: Mutex<Vec<Call>>,
    fail: Option<FailRule>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            next_id: AtomicI32::new(100),
            calls: Mutex::new(Vec::new()),
            fail: None,
        }
    }
}

impl FakeTransport {
    /// Fail every call for which `rule` returns an error (the call is still recorded).
    pub fn failing(rule: impl Fn(&Call) -> Option<Error> + Send + Sync + 'static) -> Self {
        Self {
            fail: Some(Box::new(rule)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { to, text, .. } if to == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Text of a message previously produced by `send_text`.
    pub fn text_of(&self, msg: MessageRef) -> Option<String> {
        self.calls().into_iter().find_map(|c| match c {
            Call::Send { text, produced, .. } if produced == msg => Some(text),
            _ => None,
        })
    }

    fn record(&self, make: impl FnOnce(MessageRef) -> Call, to: ChatId) -> Result<MessageRef> {
        let produced = MessageRef {
            chat_id: to,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        let call = make(produced);
        let failure = self.fail.as_ref().and_then(|f| f(&call));
        self.calls.lock().unwrap().push(call);
        match failure {
            Some(e) => Err(e),
            None => Ok(produced),
        }
    }
}

#[async_trait]
impl MessagingPort for FakeTransport {
    async fn forward_message(&self, to: ChatId, source: MessageRef) -> Result<MessageRef> {
        self.record(
            |produced| Call::Forward {
                to,
                source,
                produced,
            },
            to,
        )
    }

    async fn send_text(
        &self,
        to: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef> {
        self.record(
            |produced| Call::Send {
                to,
                text: text.to_string(),
                reply_to,
                produced,
            },
            to,
        )
    }

    async fn copy_message(&self, to: ChatId, source: MessageRef) -> Result<MessageRef> {
        self.record(
            |produced| Call::Copy {
                to,
                source,
                produced,
            },
            to,
        )
    }
}

pub fn unreachable_error() -> Error {
    Error::Unreachable("Forbidden: bot was blocked by the user".to_string())
}

/// Private text message from user `id` (username `user<id>`).
pub fn private_message(id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: ChatId(id),
        chat_kind: ChatKind::Private,
        message_id: MessageId(1),
        from: Some(Sender {
            id: UserId(id),
            is_bot: false,
            username: Some(format!("user{id}")),
            first_name: Some("Test".to_string()),
        }),
        text: Some(text.to_string()),
        caption: None,
        reply_to: None,
        forward_from: None,
    }
}

/// Moderator text message in the moderator chat replying to `quoted`.
pub fn moderator_reply(text: &str, quoted: QuotedMessage) -> IncomingMessage {
    IncomingMessage {
        chat_id: MOD_CHAT,
        chat_kind: ChatKind::Supergroup,
        message_id: MessageId(50),
        from: Some(Sender {
            id: UserId(9),
            is_bot: false,
            username: Some("moderator".to_string()),
            first_name: Some("Mod".to_string()),
        }),
        text: Some(text.to_string()),
        caption: None,
        reply_to: Some(quoted),
        forward_from: None,
    }
}
