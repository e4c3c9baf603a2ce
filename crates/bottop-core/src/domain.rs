/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The user behind one update. Never stored across updates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id),
            display_name: display_name.into(),
        }
    }
}
