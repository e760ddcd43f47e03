//! Telegram update handlers.
//!
//! Every message update is converted into the core `IncomingMessage` and handed
//! to the relay, which decides between the question and answer flows.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use tracing::debug;

use crate::router::AppState;

mod convert;

pub use convert::incoming_from_message;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let incoming = incoming_from_message(&msg);
    let outcome = state.relay.handle(&incoming).await;
    debug!(
        chat_id = incoming.chat_id.0,
        message_id = incoming.message_id.0,
        ?outcome,
        "update handled"
    );
    Ok(())
}
