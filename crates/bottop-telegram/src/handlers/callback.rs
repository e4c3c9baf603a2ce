use teloxide::types::CallbackQuery;

use bottop_core::{
    domain::{ChatId, Identity, MessageId, MessageRef},
    messaging::types::{self, IncomingUpdate},
};

pub(crate) fn to_update(q: &CallbackQuery) -> IncomingUpdate {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    IncomingUpdate::Callback(types::CallbackQuery {
        chat_id: message.map(|m| m.chat_id),
        identity: Identity::new(q.from.id.0 as i64, q.from.first_name.clone()),
        callback_id: q.id.clone(),
        // Callbacks without data still need an answer; "" routes to ack-only.
        data: q.data.clone().unwrap_or_default(),
        message,
    })
}
