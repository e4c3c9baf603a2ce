//! Telegram update handlers.
//!
//! Each endpoint converts the teloxide update into a core `IncomingUpdate` and
//! hands it to the `UpdateHandler`, which never fails. Endpoints therefore
//! always return `Ok`, so one bad update cannot stop the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    state.handler.handle(callback::to_update(&q)).await;
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = commands::to_update(&msg, state.bot_username.as_deref()) else {
        return Ok(());
    };
    state.handler.handle(update).await;
    Ok(())
}
