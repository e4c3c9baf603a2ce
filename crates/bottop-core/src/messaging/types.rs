use crate::domain::{ChatId, Identity, MessageRef};

/// Incoming update model, independent of the transport.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub identity: Identity,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub identity: Identity,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: Option<ChatId>,
    pub identity: Identity,
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// How the transport should parse outgoing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Html,
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback_data(&self) -> Option<&str> {
        match &self.action {
            ButtonAction::Callback(data) => Some(data),
            ButtonAction::Url(_) => None,
        }
    }
}

/// Inline keyboard laid out in rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Lay buttons out `per_row` at a time.
    pub fn chunked(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut rows = Vec::new();
        let mut row = Vec::new();
        for b in buttons {
            row.push(b);
            if row.len() == per_row {
                rows.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.buttons().count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }
}

/// Text plus optional buttons, ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedResponse {
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl RenderedResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// What to do with a button press: the toast for the acknowledgement and an
/// optional in-place edit of the originating message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackReply {
    pub ack_text: Option<String>,
    pub edit: Option<RenderedResponse>,
}

impl CallbackReply {
    pub fn ack_only() -> Self {
        Self::default()
    }

    pub fn edit(response: RenderedResponse) -> Self {
        Self {
            ack_text: None,
            edit: Some(response),
        }
    }
}
