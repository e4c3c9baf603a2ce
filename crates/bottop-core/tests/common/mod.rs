#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicI32, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;

use bottop_core::{
    config::{Config, EmojiSet, MenuTexts},
    dispatcher::Dispatcher,
    domain::{ChatId, Identity, MessageId, MessageRef},
    errors::Error,
    handler::UpdateHandler,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, InlineKeyboard, TextFormat, TextMessage},
    },
    security::{AuthMode, AuthorizationPolicy},
    Result,
};

pub const OWNER: i64 = 6037121105;
pub const TOKEN: &str = "123456789:ABCdefGhIJKlmNoPQRstuVWXyz";

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Send {
        chat_id: i64,
        text: String,
        format: TextFormat,
        keyboard: Option<InlineKeyboard>,
    },
    Edit {
        message_id: i32,
        text: String,
        format: TextFormat,
        keyboard: Option<InlineKeyboard>,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
    },
}

/// Records every outbound call. Can be told to fail the next N send/edit calls.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
    failures_left: AtomicUsize,
    next_id: AtomicI32,
}

impl RecordingMessenger {
    pub fn failing(n: usize) -> Self {
        let m = Self::default();
        m.failures_left.store(n, Ordering::SeqCst);
        m
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::External("telegram error: Bad Request".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(Call::Send {
            chat_id: chat_id.0,
            text: text.to_string(),
            format,
            keyboard: keyboard.cloned(),
        })?;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        })
    }

    async fn edit_message(
        &self,
        msg: MessageRef,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()> {
        self.record(Call::Edit {
            message_id: msg.message_id.0,
            text: text.to_string(),
            format,
            keyboard: keyboard.cloned(),
        })
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Answer {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}

pub fn config(mode: AuthMode) -> Config {
    Config {
        bot_token: TOKEN.to_string(),
        policy: AuthorizationPolicy::new(mode, Some(OWNER), vec![OWNER]),
        texts: MenuTexts::default(),
        emojis: EmojiSet::default(),
        log_level: "info".to_string(),
        log_file: None,
    }
}

pub fn handler(cfg: Config, messenger: Arc<RecordingMessenger>) -> UpdateHandler {
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(cfg)));
    UpdateHandler::new(dispatcher, messenger)
}

pub fn command(user_id: i64, name: &str) -> IncomingUpdate {
    IncomingUpdate::Command(Command {
        chat_id: ChatId(user_id),
        identity: Identity::new(user_id, "Ana"),
        name: name.to_string(),
    })
}

pub fn callback(user_id: i64, data: &str, message_id: i32) -> IncomingUpdate {
    IncomingUpdate::Callback(CallbackQuery {
        chat_id: Some(ChatId(user_id)),
        identity: Identity::new(user_id, "Ana"),
        callback_id: format!("cb-{data}"),
        data: data.to_string(),
        message: Some(MessageRef {
            chat_id: ChatId(user_id),
            message_id: MessageId(message_id),
        }),
    })
}

pub fn text(user_id: i64, body: &str) -> IncomingUpdate {
    IncomingUpdate::Text(TextMessage {
        chat_id: ChatId(user_id),
        identity: Identity::new(user_id, "Ana"),
        text: body.to_string(),
    })
}
