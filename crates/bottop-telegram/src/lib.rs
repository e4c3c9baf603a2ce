//! Telegram adapter (teloxide).
//!
//! This crate implements the `bottop-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    ApiError, RequestError,
};

pub mod handlers;
pub mod router;

use bottop_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, InlineButton, InlineKeyboard, TextFormat},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

fn to_button(button: &InlineButton) -> Result<InlineKeyboardButton> {
    match &button.action {
        ButtonAction::Callback(data) => Ok(InlineKeyboardButton::callback(
            button.label.clone(),
            data.clone(),
        )),
        ButtonAction::Url(url) => {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| Error::External(format!("invalid button url {url:?}: {e}")))?;
            Ok(InlineKeyboardButton::url(button.label.clone(), parsed))
        }
    }
}

/// Convert a transport-neutral keyboard into Telegram markup.
pub fn to_markup(keyboard: &InlineKeyboard) -> Result<InlineKeyboardMarkup> {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(to_button).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef> {
        let markup = keyboard.map(to_markup).transpose()?;

        let mut req = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string());
        if format == TextFormat::Html {
            req = req.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = markup {
            req = req.reply_markup(markup);
        }
        let msg = req.await.map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_message(
        &self,
        msg: MessageRef,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()> {
        let markup = keyboard.map(to_markup).transpose()?;

        let mut req = self.bot.edit_message_text(
            Self::tg_chat(msg.chat_id),
            Self::tg_msg_id(msg.message_id),
            text.to_string(),
        );
        if format == TextFormat::Html {
            req = req.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = markup {
            req = req.reply_markup(markup);
        }

        match req.await {
            Ok(_) => Ok(()),
            // Pressing the button of the screen already shown.
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(t) = text {
            req = req.text(t.to_string());
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }
}
