use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};
use tracing::{info, warn};

use bottop_core::{
    config::Config, dispatcher::COMMANDS, handler::UpdateHandler,
    messaging::port::MessagingPort,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub handler: UpdateHandler,
    /// `@username` of this bot, for ignoring `/cmd@otherbot` in groups.
    pub bot_username: Option<String>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Fails fast on a revoked or mistyped token.
    let me = bot.get_me().await?;
    let username = me.username().to_string();
    println!("✅ {} iniciado: @{username}", cfg.texts.bot_name);
    info!(bot = %username, "connected to telegram");

    if let Err(e) = register_commands(&bot).await {
        warn!("failed to register command list: {e}");
    }

    let dispatcher = Arc::new(bottop_core::dispatcher::Dispatcher::new(cfg.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        handler: UpdateHandler::new(dispatcher, messenger),
        bot_username: Some(username),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    println!("Pressione Ctrl+C para parar");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}

async fn register_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands = COMMANDS
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description));
    bot.set_my_commands(commands).await?;
    Ok(())
}
