use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    errors::Error,
    security::{AuthMode, AuthorizationPolicy},
    templates, Result,
};

pub const DEFAULT_BOT_NAME: &str = "Bot Top";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_DEVELOPER: &str = "Seu Nome";
pub const DEFAULT_GITHUB: &str = "https://github.com/seu-usuario/telegram-bot-top";
pub const DEFAULT_WELCOME: &str = "🌟 *Bem-vindo ao {bot}!* 🌟\n\n\
Este é um bot desenvolvido com Rust e muito carinho!\n\n\
Use os botões abaixo para navegar:";

/// Emoji labels used across every screen.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmojiSet {
    pub start: String,
    pub menu: String,
    pub settings: String,
    pub info: String,
    pub warning: String,
    pub success: String,
    pub error: String,
    pub home: String,
    pub back: String,
    pub heart: String,
}

impl Default for EmojiSet {
    fn default() -> Self {
        Self {
            start: "🚀".to_string(),
            menu: "📱".to_string(),
            settings: "⚙️".to_string(),
            info: "ℹ️".to_string(),
            warning: "⚠️".to_string(),
            success: "✅".to_string(),
            error: "❌".to_string(),
            home: "🏠".to_string(),
            back: "↩️".to_string(),
            heart: "❤️".to_string(),
        }
    }
}

/// Static texts shown by the menu. Only `welcome_message` is a template
/// (Telegram markdown + `{placeholders}`); the rest is shown verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuTexts {
    pub bot_name: String,
    pub bot_username: Option<String>,
    pub version: String,
    pub developer: String,
    pub github: String,
    pub welcome_message: String,
}

impl Default for MenuTexts {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            bot_username: None,
            version: DEFAULT_VERSION.to_string(),
            developer: DEFAULT_DEVELOPER.to_string(),
            github: DEFAULT_GITHUB.to_string(),
            welcome_message: DEFAULT_WELCOME.to_string(),
        }
    }
}

/// On-disk shape of `MENU_CONFIG_FILE`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MenuFile {
    bot_name: Option<String>,
    bot_username: Option<String>,
    version: Option<String>,
    developer: Option<String>,
    github: Option<String>,
    welcome_message: Option<String>,
    emojis: EmojiSet,
}

/// Typed configuration, built once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub policy: AuthorizationPolicy,
    pub texts: MenuTexts,
    pub emojis: EmojiSet,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load from the process environment (after `.env`, which never overrides).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Credential
        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;
        if !looks_like_bot_token(&bot_token) {
            return Err(Error::Config(
                "BOT_TOKEN is malformed (expected <bot id>:<secret>)".to_string(),
            ));
        }

        // Authorization
        let owner_from = |key: &str| -> Result<Option<i64>> {
            get(key)
                .map(|raw| {
                    raw.trim().parse::<i64>().map_err(|_| {
                        Error::Config(format!("{key} must be a numeric Telegram user id"))
                    })
                })
                .transpose()
        };
        let owner_id = owner_from("OWNER_ID")?;
        let user_id = owner_from("USER_ID")?;

        let mode = match get("AUTH_MODE") {
            Some(raw) => raw.parse::<AuthMode>()?,
            None if owner_id.is_none() && user_id.is_some() => AuthMode::ExplicitDenial,
            None => AuthMode::Open,
        };
        let owner_id = owner_id.or(user_id);
        if mode.is_restricted() && owner_id.is_none() {
            return Err(Error::Config(format!(
                "AUTH_MODE={mode} requires OWNER_ID or USER_ID"
            )));
        }

        let mut admin_ids = parse_csv_i64(get("ADMIN_IDS"));
        if admin_ids.is_empty() {
            admin_ids.extend(owner_id);
        }

        // Texts: defaults < JSON file < env
        let file = match get("MENU_CONFIG_FILE") {
            Some(path) => load_menu_file(Path::new(&path))?,
            None => MenuFile::default(),
        };
        let defaults = MenuTexts::default();
        let texts = MenuTexts {
            bot_name: get("BOT_NAME")
                .or(file.bot_name)
                .unwrap_or(defaults.bot_name),
            bot_username: get("BOT_USERNAME").or(file.bot_username),
            version: get("BOT_VERSION")
                .or(file.version)
                .unwrap_or(defaults.version),
            developer: get("DEVELOPER")
                .or(file.developer)
                .unwrap_or(defaults.developer),
            github: get("GITHUB_URL").or(file.github).unwrap_or(defaults.github),
            welcome_message: get("WELCOME_MESSAGE")
                .map(|s| unescape_newlines(&s))
                .or(file.welcome_message)
                .unwrap_or(defaults.welcome_message),
        };

        templates::validate("welcome_message", &texts.welcome_message)?;
        check_link("GITHUB_URL", &texts.github)?;

        Ok(Self {
            bot_token,
            policy: AuthorizationPolicy::new(mode, owner_id, admin_ids),
            texts,
            emojis: file.emojis,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }
}

fn load_menu_file(path: &Path) -> Result<MenuFile> {
    let raw = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Button links are parsed again by the transport; reject them here instead.
fn check_link(key: &str, raw: &str) -> Result<()> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| Error::Config(format!("{key} is not a valid URL ({raw:?}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!(
            "{key} must be an http(s) link (got {raw:?})"
        )));
    }
    Ok(())
}

fn looks_like_bot_token(token: &str) -> bool {
    let Some((id, secret)) = token.split_once(':') else {
        return false;
    };
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !secret.trim().is_empty()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn unescape_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
