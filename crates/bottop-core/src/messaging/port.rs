use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{InlineKeyboard, TextFormat},
    Result,
};

/// Outbound side of the chat transport.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef>;

    /// Replace text and buttons of an existing message in place.
    async fn edit_message(
        &self,
        msg: MessageRef,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()>;

    /// Stop the button's loading state. `text` shows as a toast.
    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
