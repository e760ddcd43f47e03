use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tracing::{info, warn};

use modrelay_core::{config::Config, messaging::port::MessagingPort, relay::Relay};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "modrelay started"),
        Err(e) => warn!(error = %e, "could not fetch bot identity"),
    }
    info!(
        moderator_chat = cfg.moderator_chat_id.0,
        audit = cfg.audit_log_path.is_some(),
        "relaying private questions to the moderator chat"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Relay::from_config(&cfg, messenger);

    let state = Arc::new(AppState { relay });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("modrelay stopped");
    Ok(())
}
