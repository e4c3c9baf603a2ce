use teloxide::types::Message;

use bottop_core::{
    domain::{ChatId, Identity},
    messaging::types::{Command, IncomingUpdate, TextMessage},
};

#[derive(Debug, PartialEq, Eq)]
struct ParsedCommand {
    name: String,
    /// Bot named in `/cmd@bot`, if any.
    target: Option<String>,
}

fn parse_command(text: &str) -> Option<ParsedCommand> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    // Telegram may send `/cmd@botname arg1 ...`; arguments are not used.
    let first = text.split(char::is_whitespace).next().unwrap_or("");

    let mut head = first.trim_start_matches('/').splitn(2, '@');
    let name = head.next().unwrap_or("").to_lowercase();
    let target = head.next().map(|t| t.to_string()).filter(|t| !t.is_empty());

    if name.is_empty() {
        return None;
    }
    Some(ParsedCommand { name, target })
}

pub(crate) fn to_update(msg: &Message, bot_username: Option<&str>) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;
    let chat_id = ChatId(msg.chat.id.0);
    let identity = Identity::new(user.id.0 as i64, user.first_name.clone());

    let Some(cmd) = parse_command(text) else {
        return Some(IncomingUpdate::Text(TextMessage {
            chat_id,
            identity,
            text: text.to_string(),
        }));
    };

    if let (Some(target), Some(me)) = (cmd.target.as_deref(), bot_username) {
        if !target.eq_ignore_ascii_case(me) {
            return None;
        }
    }

    Some(IncomingUpdate::Command(Command {
        chat_id,
        identity,
        name: cmd.name,
    }))
}
