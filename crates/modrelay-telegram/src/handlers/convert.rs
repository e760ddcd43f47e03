use teloxide::types::{Chat, Message, User};

use modrelay_core::{
    domain::{ChatId, MessageId, UserId},
    messaging::types::{ChatKind, IncomingMessage, QuotedMessage, Sender},
};

pub fn incoming_from_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        chat_id: ChatId(msg.chat.id.0),
        chat_kind: chat_kind(&msg.chat),
        message_id: MessageId(msg.id.0),
        from: msg.from().map(sender_from_user),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        reply_to: msg.reply_to_message().map(quoted_from_message),
        forward_from: forward_origin(msg),
    }
}

fn quoted_from_message(msg: &Message) -> QuotedMessage {
    QuotedMessage {
        message_id: MessageId(msg.id.0),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        forward_from: forward_origin(msg),
    }
}

/// Only present when the original sender allows linking forwards to their account.
fn forward_origin(msg: &Message) -> Option<UserId> {
    msg.forward_from_user().map(|u| UserId(u.id.0 as i64))
}

fn sender_from_user(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        is_bot: user.is_bot,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
    }
}

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_group() {
        ChatKind::Group
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else {
        ChatKind::Channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_text_message() {
        let json = r#"{
            "message_id": 7,
            "date": 1567927221,
            "chat": {"id": 555, "first_name": "Alice", "username": "alice", "type": "private"},
            "from": {"id": 555, "is_bot": false, "first_name": "Alice", "username": "alice"},
            "text": "How do closures work?"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let incoming = incoming_from_message(&msg);

        assert_eq!(incoming.chat_id, ChatId(555));
        assert_eq!(incoming.chat_kind, ChatKind::Private);
        assert_eq!(incoming.message_id, MessageId(7));
        assert_eq!(incoming.text.as_deref(), Some("How do closures work?"));
        assert!(incoming.reply_to.is_none());

        let sender = incoming.from.unwrap();
        assert_eq!(sender.id, UserId(555));
        assert!(!sender.is_bot);
        assert_eq!(sender.label(), "@alice");
    }

    #[test]
    fn supergroup_reply_carries_the_quoted_marker() {
        let json = r#"{
            "message_id": 50,
            "date": 1567927300,
            "chat": {"id": -1001160242915, "title": "Moderators", "type": "supergroup"},
            "from": {"id": 9, "is_bot": false, "first_name": "Mod"},
            "text": "Closures capture variables by reference.",
            "reply_to_message": {
                "message_id": 21,
                "date": 1567927222,
                "chat": {"id": -1001160242915, "title": "Moderators", "type": "supergroup"},
                "from": {"id": 4242, "is_bot": true, "first_name": "Relay", "username": "relay_bot"},
                "text": "USER_ID:555 | @alice"
            }
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let incoming = incoming_from_message(&msg);

        assert_eq!(incoming.chat_kind, ChatKind::Supergroup);
        assert_eq!(incoming.chat_id, ChatId(-1001160242915));
        assert!(incoming.is_text());

        let quoted = incoming.reply_to.unwrap();
        assert_eq!(quoted.message_id, MessageId(21));
        assert_eq!(quoted.text.as_deref(), Some("USER_ID:555 | @alice"));
        assert!(quoted.forward_from.is_none());
    }
}
