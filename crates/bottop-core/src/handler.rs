//! Outer boundary for one update: dispatch, deliver, never fail.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    dispatcher::Dispatcher,
    domain::{ChatId, MessageRef},
    formatting::strip_html,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, RenderedResponse, TextFormat, TextMessage},
    },
    security::AccessDecision,
    Result,
};

#[derive(Clone)]
pub struct UpdateHandler {
    dispatcher: Arc<Dispatcher>,
    messenger: Arc<dyn MessagingPort>,
}

impl UpdateHandler {
    pub fn new(dispatcher: Arc<Dispatcher>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            dispatcher,
            messenger,
        }
    }

    /// Handle one update completely. Errors are logged, never returned.
    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Command(cmd) => self.on_command(cmd).await,
            IncomingUpdate::Callback(q) => self.on_callback(q).await,
            IncomingUpdate::Text(msg) => self.on_text(&msg),
        }
    }

    async fn on_command(&self, cmd: Command) {
        match self.dispatcher.handle_command(&cmd.name, &cmd.identity) {
            Ok(Some(resp)) => self.send(cmd.chat_id, &resp).await,
            Ok(None) => {}
            Err(e) => {
                error!(user_id = cmd.identity.user_id.0, command = %cmd.name, "command failed: {e}");
                self.send_generic_error(cmd.chat_id).await;
            }
        }
    }

    async fn on_callback(&self, q: CallbackQuery) {
        let result = self.dispatcher.handle_callback(&q.data, &q.identity);

        // The button keeps spinning until answered, so answer before anything else.
        let ack_text = result.as_ref().ok().and_then(|r| r.ack_text.as_deref());
        if let Err(e) = self
            .messenger
            .answer_callback_query(&q.callback_id, ack_text)
            .await
        {
            warn!(callback_id = %q.callback_id, "failed to answer callback query: {e}");
        }

        match result {
            Ok(reply) => {
                let Some(edit) = reply.edit else {
                    return;
                };
                match q.message {
                    Some(msg) => self.edit(msg, &edit).await,
                    None => debug!(callback = %q.data, "callback without message; nothing to edit"),
                }
            }
            Err(e) => {
                error!(user_id = q.identity.user_id.0, callback = %q.data, "callback failed: {e}");
                if let Some(chat_id) = q.chat_id.or(q.message.map(|m| m.chat_id)) {
                    self.send_generic_error(chat_id).await;
                }
            }
        }
    }

    fn on_text(&self, msg: &TextMessage) {
        let user_id = msg.identity.user_id.0;
        match self.dispatcher.config().policy.check(msg.identity.user_id) {
            AccessDecision::Allowed(_) => {
                debug!(user_id, chat_id = msg.chat_id.0, len = msg.text.len(), "ignoring plain text")
            }
            decision => {
                warn!(user_id, outcome = decision.outcome(), "unauthorized message")
            }
        }
    }

    async fn send(&self, chat_id: ChatId, resp: &RenderedResponse) {
        let keyboard = resp.keyboard.as_ref();
        let html = self
            .messenger
            .send_message(chat_id, &resp.text, TextFormat::Html, keyboard)
            .await;
        let Err(e) = html else {
            return;
        };
        warn!(chat_id = chat_id.0, "send failed, retrying as plain text: {e}");

        let plain = strip_html(&resp.text);
        let retry: Result<MessageRef> = self
            .messenger
            .send_message(chat_id, &plain, TextFormat::Plain, keyboard)
            .await;
        if let Err(e) = retry {
            error!(chat_id = chat_id.0, "plain-text send failed: {e}");
        }
    }

    async fn edit(&self, msg: MessageRef, resp: &RenderedResponse) {
        let keyboard = resp.keyboard.as_ref();
        let html = self
            .messenger
            .edit_message(msg, &resp.text, TextFormat::Html, keyboard)
            .await;
        let Err(e) = html else {
            return;
        };
        warn!(chat_id = msg.chat_id.0, message_id = msg.message_id.0, "edit failed, retrying as plain text: {e}");

        let plain = strip_html(&resp.text);
        if let Err(e) = self
            .messenger
            .edit_message(msg, &plain, TextFormat::Plain, keyboard)
            .await
        {
            error!(chat_id = msg.chat_id.0, message_id = msg.message_id.0, "plain-text edit failed: {e}");
        }
    }

    async fn send_generic_error(&self, chat_id: ChatId) {
        let text = strip_html(&self.dispatcher.generic_error_text());
        if let Err(e) = self
            .messenger
            .send_message(chat_id, &text, TextFormat::Plain, None)
            .await
        {
            error!(chat_id = chat_id.0, "failed to deliver error message: {e}");
        }
    }
}
