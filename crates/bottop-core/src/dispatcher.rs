//! Command and callback routing.
//!
//! Every update is answered from data built once at startup. Nothing here is
//! mutable after `Dispatcher::new`, so one instance is shared by all updates.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, EmojiSet},
    domain::Identity,
    errors::Error,
    formatting::{escape_html, markdown_to_html},
    menu::{self, CallbackRoutes, Route, Screen},
    messaging::types::{CallbackReply, InlineKeyboard, RenderedResponse},
    security::{mask_token, AccessDecision, AuthMode, Role},
    templates::{self, TemplateVars},
    Result,
};

pub type CommandHandler = fn(&Dispatcher, &Identity, Role) -> Result<RenderedResponse>;

/// Commands advertised to the transport, in menu order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("start", "Inicia o bot e mostra o menu"),
    ("help", "Mostra os comandos disponíveis"),
    ("sobre", "Informações sobre o bot"),
    ("info", "Informações técnicas"),
    ("contato", "Informações de contato"),
];

/// Route table: command name (and aliases) → handler.
fn command_routes() -> HashMap<&'static str, CommandHandler> {
    let mut routes: HashMap<&'static str, CommandHandler> = HashMap::new();
    routes.insert("start", cmd_start);
    routes.insert("help", cmd_help);
    routes.insert("sobre", cmd_about);
    routes.insert("about", cmd_about);
    routes.insert("info", cmd_info);
    routes.insert("contato", cmd_contact);
    routes.insert("contact", cmd_contact);
    routes
}

fn cmd_start(d: &Dispatcher, identity: &Identity, role: Role) -> Result<RenderedResponse> {
    d.render_main(identity, role)
}

fn cmd_help(d: &Dispatcher, _: &Identity, _: Role) -> Result<RenderedResponse> {
    Ok(RenderedResponse::text(d.help_text.clone()))
}

fn cmd_about(d: &Dispatcher, _: &Identity, _: Role) -> Result<RenderedResponse> {
    Ok(RenderedResponse::text(d.about_text.clone()))
}

fn cmd_info(d: &Dispatcher, _: &Identity, _: Role) -> Result<RenderedResponse> {
    Ok(RenderedResponse::text(d.info_text.clone()))
}

fn cmd_contact(d: &Dispatcher, _: &Identity, _: Role) -> Result<RenderedResponse> {
    Ok(RenderedResponse::text(d.screen_body(Screen::Contact)))
}

pub struct Dispatcher {
    cfg: Arc<Config>,
    /// Emojis escaped for HTML bodies; button labels use the raw set.
    emojis: EmojiSet,
    commands: HashMap<&'static str, CommandHandler>,
    callbacks: CallbackRoutes,
    screens: HashMap<Screen, RenderedResponse>,
    main_keyboard: InlineKeyboard,
    welcome_html: String,
    help_text: String,
    about_text: String,
    info_text: String,
}

impl Dispatcher {
    pub fn new(cfg: Arc<Config>) -> Self {
        Self::with_start_time(cfg, Utc::now())
    }

    pub fn with_start_time(cfg: Arc<Config>, started_at: DateTime<Utc>) -> Self {
        let emojis = escape_emojis(&cfg.emojis);
        let back = menu::back_keyboard(&cfg.emojis);
        let screens = Screen::SUB_SCREENS
            .iter()
            .map(|s| {
                let body = sub_screen_body(*s, &cfg, &emojis);
                (*s, RenderedResponse::with_keyboard(body, back.clone()))
            })
            .collect();

        Self {
            main_keyboard: menu::main_keyboard(&cfg.emojis, &cfg.texts.github),
            welcome_html: markdown_to_html(&cfg.texts.welcome_message),
            help_text: help_text(&cfg, &emojis),
            about_text: about_text(&cfg, &emojis),
            info_text: info_text(&cfg, &emojis, started_at),
            commands: command_routes(),
            callbacks: CallbackRoutes::new(),
            screens,
            emojis,
            cfg,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn callback_routes(&self) -> &CallbackRoutes {
        &self.callbacks
    }

    /// Answer a slash-command. `Ok(None)` means "stay silent".
    pub fn handle_command(
        &self,
        name: &str,
        identity: &Identity,
    ) -> Result<Option<RenderedResponse>> {
        let user_id = identity.user_id.0;
        let decision = self.cfg.policy.check(identity.user_id);
        let role = match decision {
            AccessDecision::Allowed(role) => role,
            AccessDecision::Denied => {
                warn!(user_id, name = %identity.display_name, command = name, outcome = decision.outcome(), "unauthorized command");
                return Ok(Some(RenderedResponse::text(self.denial_text())));
            }
            AccessDecision::Ignored => {
                warn!(user_id, name = %identity.display_name, command = name, outcome = decision.outcome(), "unauthorized command");
                return Ok(None);
            }
        };

        let Some(handler) = self.commands.get(name) else {
            info!(user_id, command = name, outcome = "unrecognized", "unknown command");
            return Ok(Some(RenderedResponse::text(self.unrecognized_command_text())));
        };

        let response = handler(self, identity, role)?;
        info!(user_id, name = %identity.display_name, command = name, outcome = decision.outcome(), "command handled");
        Ok(Some(response))
    }

    /// Answer a button press with an acknowledgement and, usually, an edit.
    pub fn handle_callback(&self, data: &str, identity: &Identity) -> Result<CallbackReply> {
        let user_id = identity.user_id.0;
        let decision = self.cfg.policy.check(identity.user_id);
        let role = match decision {
            AccessDecision::Allowed(role) => role,
            AccessDecision::Denied => {
                warn!(user_id, callback = data, outcome = decision.outcome(), "unauthorized callback");
                return Ok(CallbackReply {
                    ack_text: Some(self.denial_text()),
                    edit: None,
                });
            }
            AccessDecision::Ignored => {
                warn!(user_id, callback = data, outcome = decision.outcome(), "unauthorized callback");
                return Ok(CallbackReply::ack_only());
            }
        };

        match self.callbacks.resolve(data) {
            Route::Action(action) => {
                let screen = action.target();
                info!(user_id, callback = data, screen = screen.id(), "menu navigation");
                Ok(CallbackReply::edit(self.render_screen(screen, identity, role)?))
            }
            Route::UnknownScoped => {
                warn!(user_id, callback = data, outcome = "unrecognized", "unknown menu option");
                Ok(CallbackReply::edit(RenderedResponse::with_keyboard(
                    format!("{} Opção não reconhecida!", self.emojis.error),
                    menu::back_keyboard(&self.cfg.emojis),
                )))
            }
            Route::Unscoped => {
                debug!(user_id, callback = data, "ignoring foreign callback");
                Ok(CallbackReply::ack_only())
            }
        }
    }

    pub fn render_screen(
        &self,
        screen: Screen,
        identity: &Identity,
        role: Role,
    ) -> Result<RenderedResponse> {
        if screen == Screen::Main {
            return self.render_main(identity, role);
        }
        self.screens
            .get(&screen)
            .cloned()
            .ok_or_else(|| Error::External(format!("screen {} is not registered", screen.id())))
    }

    /// Main menu; identical for `/start` and `back_menu`.
    pub fn render_main(&self, identity: &Identity, role: Role) -> Result<RenderedResponse> {
        let e = &self.emojis;
        let t = &self.cfg.texts;
        let owner = owner_label(&self.cfg);
        let welcome = templates::render(
            "welcome_message",
            &self.welcome_html,
            &TemplateVars {
                name: &identity.display_name,
                bot: &t.bot_name,
                version: &t.version,
                developer: &t.developer,
                owner: &owner,
                github: &t.github,
            },
        )?;

        let text = format!(
            "{} <b>Olá, {}!</b> {}\n\n{}\n\n{}\n\n<i>Desenvolvido por: {}</i>\nVersão: {}",
            e.start,
            escape_html(&identity.display_name),
            e.heart,
            role_line(role),
            welcome,
            escape_html(&t.developer),
            escape_html(&t.version),
        );
        Ok(RenderedResponse::with_keyboard(
            text,
            self.main_keyboard.clone(),
        ))
    }

    pub fn denial_text(&self) -> String {
        format!("{} Acesso negado!", self.cfg.emojis.error)
    }

    pub fn generic_error_text(&self) -> String {
        format!(
            "{} Ocorreu um erro inesperado!\nTente novamente mais tarde.",
            self.emojis.error
        )
    }

    fn unrecognized_command_text(&self) -> String {
        format!(
            "{} Comando não reconhecido!\nUse /help para ver os comandos disponíveis.",
            self.emojis.error
        )
    }

    fn screen_body(&self, screen: Screen) -> String {
        self.screens
            .get(&screen)
            .map(|r| r.text.clone())
            .unwrap_or_default()
    }
}

fn role_line(role: Role) -> &'static str {
    match role {
        Role::Owner => "👑 <b>Dono do Bot</b> 👑",
        Role::Admin => "🛡️ <b>Administrador</b>",
        Role::User => "👤 <b>Usuário</b>",
    }
}

fn owner_label(cfg: &Config) -> String {
    cfg.policy
        .owner_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "não configurado".to_string())
}

fn escape_emojis(e: &EmojiSet) -> EmojiSet {
    EmojiSet {
        start: escape_html(&e.start),
        menu: escape_html(&e.menu),
        settings: escape_html(&e.settings),
        info: escape_html(&e.info),
        warning: escape_html(&e.warning),
        success: escape_html(&e.success),
        error: escape_html(&e.error),
        home: escape_html(&e.home),
        back: escape_html(&e.back),
        heart: escape_html(&e.heart),
    }
}

fn sub_screen_body(screen: Screen, cfg: &Config, e: &EmojiSet) -> String {
    match screen {
        Screen::About => format!(
            "{} <b>SOBRE</b>\n\n\
             Este é um bot desenvolvido em Rust utilizando a biblioteca <code>teloxide</code>.\n\n\
             🔧 <b>Funcionalidades:</b>\n\
             • Menu interativo\n\
             • Botões inline\n\
             • Sistema de configuração\n\
             • Identificação do dono\n\n\
             {} <i>Totalmente personalizável!</i>",
            e.info, e.heart
        ),
        Screen::Settings => format!(
            "{} <b>CONFIGURAÇÕES</b>\n\n\
             ⚙️ <b>Opções disponíveis:</b>\n\
             • Notificações\n\
             • Idioma\n\
             • Tema\n\n\
             {} <b>Em breve mais opções!</b>",
            e.settings, e.warning
        ),
        Screen::Help => format!(
            "{} <b>AJUDA</b>\n\n\
             📌 <b>Como usar:</b>\n\
             • Use <code>/start</code> para abrir o menu\n\
             • Clique nos botões para navegar\n\
             • Use <code>/help</code> para ver comandos\n\n\
             {} <b>Dúvidas? Entre em contato!</b>",
            e.info, e.warning
        ),
        Screen::Contact => format!(
            "{} <b>CONTATO</b>\n\n\
             📞 <b>Informações de contato:</b>\n\n\
             👑 <b>Dono:</b> ID {}\n\
             🌐 <b>GitHub:</b> {}\n\n\
             {} <i>Reservado para assuntos importantes</i>",
            e.info,
            escape_html(&owner_label(cfg)),
            escape_html(&cfg.texts.github),
            e.warning
        ),
        Screen::Main => String::new(),
    }
}

fn help_text(cfg: &Config, e: &EmojiSet) -> String {
    let mut out = format!(
        "{} <b>COMANDOS DISPONÍVEIS</b>\n\n\
         🚀 /start - Inicia o bot e mostra o menu\n\
         ℹ️ /help - Mostra esta mensagem\n\
         👨‍💻 /sobre - Informações sobre o bot\n\
         📊 /info - Informações técnicas\n\
         📞 /contato - Informações de contato\n\n",
        e.info
    );

    let others = match cfg.policy.mode {
        AuthMode::Open => None,
        AuthMode::ExplicitDenial => Some("Outros usuários recebem acesso negado"),
        AuthMode::Silent => Some("Mensagens de outros usuários serão ignoradas"),
    };
    if let Some(others) = others {
        out.push_str(&format!(
            "🔒 <b>Segurança:</b>\n\
             • Este bot só responde ao usuário com ID: <code>{}</code>\n\
             • {others}\n\n",
            escape_html(&owner_label(cfg))
        ));
    }

    out.push_str(&format!(
        "{} <b>Use o menu interativo para mais opções!</b>",
        e.warning
    ));
    out
}

fn about_text(cfg: &Config, e: &EmojiSet) -> String {
    let t = &cfg.texts;
    format!(
        "{} <b>SOBRE O BOT</b>\n\n\
         🤖 <b>Nome:</b> {}\n\
         📱 <b>Versão:</b> {}\n\
         👨‍💻 <b>Desenvolvedor:</b> {}\n\
         🦀 <b>Linguagem:</b> Rust\n\
         📚 <b>Biblioteca:</b> teloxide\n\n\
         🌐 <b>GitHub:</b> {}\n\n\
         {} <i>Desenvolvido com carinho para a comunidade</i>",
        e.info,
        escape_html(&t.bot_name),
        escape_html(&t.version),
        escape_html(&t.developer),
        escape_html(&t.github),
        e.heart
    )
}

fn info_text(cfg: &Config, e: &EmojiSet, started_at: DateTime<Utc>) -> String {
    let t = &cfg.texts;
    let bot = match &t.bot_username {
        Some(u) => format!("{} (@{})", t.bot_name, u.trim_start_matches('@')),
        None => t.bot_name.clone(),
    };
    let admins = if cfg.policy.admin_ids.is_empty() {
        "nenhum".to_string()
    } else {
        cfg.policy
            .admin_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{} <b>Informações do Bot:</b>\n\n\
         🤖 <b>Bot:</b> {}\n\
         🔑 <b>Token:</b> <code>{}</code>\n\
         👤 <b>User ID autorizado:</b> <code>{}</code>\n\
         🛡️ <b>Administradores:</b> {}\n\
         🔒 <b>Modo de acesso:</b> {}\n\
         📦 <b>Versão:</b> {}\n\
         🕐 <b>Online desde:</b> {}\n\n\
         ⚙️ <b>Funcionalidades:</b>\n\
         • Sistema de segurança por ID de usuário\n\
         • Menu interativo com botões inline\n\
         • Logs de atividades",
        e.info,
        escape_html(&bot),
        escape_html(&mask_token(&cfg.bot_token)),
        escape_html(&owner_label(cfg)),
        admins,
        cfg.policy.mode,
        escape_html(&t.version),
        started_at.format("%d/%m/%Y %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;
    use crate::{
        config::MenuTexts,
        menu::BACK_MENU,
        security::{AuthMode, AuthorizationPolicy},
    };

    const TOKEN: &str = "123456789:ABCdefGhIJKlmNoPQRstuVWXyz";

    fn cfg(mode: AuthMode, owner: Option<i64>) -> Arc<Config> {
        Arc::new(Config {
            bot_token: TOKEN.to_string(),
            policy: AuthorizationPolicy::new(mode, owner, owner.into_iter().collect()),
            texts: MenuTexts::default(),
            emojis: EmojiSet::default(),
            log_level: "info".to_string(),
            log_file: None,
        })
    }

    fn dispatcher(mode: AuthMode) -> Dispatcher {
        Dispatcher::new(cfg(mode, Some(42)))
    }

    fn ana(id: i64) -> Identity {
        Identity::new(id, "Ana")
    }

    fn no_placeholders(text: &str) {
        let re = Regex::new(r"\{[a-z]+\}").unwrap();
        assert!(!re.is_match(text), "placeholder left in {text:?}");
    }

    const ALL_COMMANDS: &[&str] = &["start", "help", "sobre", "about", "info", "contato", "contact"];

    #[test]
    fn every_command_renders_for_an_authorized_user() {
        let d = dispatcher(AuthMode::ExplicitDenial);
        for cmd in ALL_COMMANDS {
            let resp = d.handle_command(cmd, &ana(42)).unwrap().unwrap();
            assert!(!resp.text.trim().is_empty(), "{cmd} rendered nothing");
            assert_ne!(resp.text, d.denial_text());
            no_placeholders(&resp.text);
        }
    }

    #[test]
    fn start_contains_welcome_credit_and_version() {
        let d = dispatcher(AuthMode::Open);
        let resp = d.handle_command("start", &ana(43)).unwrap().unwrap();
        assert!(resp.text.contains("Olá, Ana!"));
        assert!(resp.text.contains("<b>Bem-vindo ao Bot Top!</b>"));
        assert!(resp.text.contains("Desenvolvido por: Seu Nome"));
        assert!(resp.text.contains("Versão: 1.0.0"));
        assert!(resp.text.contains("👤 <b>Usuário</b>"));
        assert!(!resp.text.contains("👑"));
        assert_eq!(resp.keyboard.as_ref().map(|k| k.len()), Some(5));
    }

    #[test]
    fn about_and_info_carry_configured_texts() {
        let d = dispatcher(AuthMode::Open);
        let about = d.handle_command("sobre", &ana(1)).unwrap().unwrap();
        assert!(about.text.contains("1.0.0"));
        assert!(about.text.contains("Seu Nome"));
        assert_eq!(d.handle_command("about", &ana(1)).unwrap().unwrap(), about);

        let info = d.handle_command("info", &ana(1)).unwrap().unwrap();
        assert!(info.text.contains("<code>123456789:***</code>"));
        assert!(!info.text.contains("ABCdef"));
        assert!(!info.text.contains("WXyz"));
        assert!(info.text.contains("<code>42</code>"));
    }

    #[test]
    fn explicit_mode_denies_strangers_consistently() {
        let d = dispatcher(AuthMode::ExplicitDenial);
        for cmd in ALL_COMMANDS.iter().chain(&["bogus"]) {
            let owner = d.handle_command(cmd, &ana(42)).unwrap().unwrap();
            assert_ne!(owner.text, "❌ Acesso negado!");
            let stranger = d.handle_command(cmd, &ana(43)).unwrap().unwrap();
            assert_eq!(stranger.text, "❌ Acesso negado!");
            assert!(stranger.keyboard.is_none());
        }
    }

    #[test]
    fn silent_mode_says_nothing_to_strangers() {
        let d = dispatcher(AuthMode::Silent);
        for cmd in ALL_COMMANDS {
            assert!(d.handle_command(cmd, &ana(43)).unwrap().is_none());
        }
        let reply = d.handle_callback("menu_about", &ana(43)).unwrap();
        assert_eq!(reply, CallbackReply::ack_only());
    }

    #[test]
    fn explicit_mode_denies_callbacks_with_a_toast() {
        let d = dispatcher(AuthMode::ExplicitDenial);
        let reply = d.handle_callback("menu_about", &ana(43)).unwrap();
        assert_eq!(reply.ack_text.as_deref(), Some("❌ Acesso negado!"));
        assert!(reply.edit.is_none());
    }

    #[test]
    fn unknown_command_gets_the_fallback() {
        let d = dispatcher(AuthMode::Open);
        let resp = d.handle_command("nope", &ana(1)).unwrap().unwrap();
        assert!(resp.text.contains("Comando não reconhecido"));
    }

    #[test]
    fn every_sub_screen_has_exactly_one_back_button() {
        let d = dispatcher(AuthMode::Open);
        for screen in Screen::SUB_SCREENS {
            let data = screen.callback_data().unwrap();
            let edit = d.handle_callback(&data, &ana(1)).unwrap().edit.unwrap();
            let kb = edit.keyboard.unwrap();
            let callbacks: Vec<&str> = kb.buttons().filter_map(|b| b.callback_data()).collect();
            assert_eq!(callbacks, vec![BACK_MENU]);
            assert!(kb.buttons().all(|b| b.label.ends_with("Voltar")));
            no_placeholders(&edit.text);
        }
    }

    #[test]
    fn no_button_points_to_an_unknown_route() {
        let d = dispatcher(AuthMode::Open);
        let mut keyboards = vec![d.render_main(&ana(1), Role::User).unwrap().keyboard.unwrap()];
        for screen in Screen::SUB_SCREENS {
            let r = d.render_screen(screen, &ana(1), Role::User).unwrap();
            keyboards.extend(r.keyboard);
        }
        for kb in keyboards {
            for data in kb.buttons().filter_map(|b| b.callback_data()) {
                assert!(d.callback_routes().contains(data), "dangling {data}");
            }
        }
    }

    #[test]
    fn back_returns_the_start_screen() {
        let d = dispatcher(AuthMode::Open);
        let start = d.handle_command("start", &ana(42)).unwrap().unwrap();
        for screen in Screen::SUB_SCREENS {
            let data = screen.callback_data().unwrap();
            d.handle_callback(&data, &ana(42)).unwrap();
            for back in ["back_menu", "back_to_menu"] {
                let edit = d.handle_callback(back, &ana(42)).unwrap().edit.unwrap();
                assert_eq!(edit, start);
            }
        }
    }

    #[test]
    fn unknown_menu_option_falls_back_with_back_button() {
        let d = dispatcher(AuthMode::Open);
        let edit = d
            .handle_callback("menu_nonexistent", &ana(1))
            .unwrap()
            .edit
            .unwrap();
        assert_eq!(edit.text, "❌ Opção não reconhecida!");
        assert_eq!(edit.keyboard, Some(menu::back_keyboard(&EmojiSet::default())));
    }

    #[test]
    fn foreign_callbacks_are_only_acknowledged() {
        let d = dispatcher(AuthMode::Open);
        assert_eq!(
            d.handle_callback("poll_vote:1", &ana(1)).unwrap(),
            CallbackReply::ack_only()
        );
    }

    #[test]
    fn display_name_is_escaped() {
        let d = dispatcher(AuthMode::Open);
        let resp = d
            .handle_command("start", &Identity::new(1, "<Ana & Bia>"))
            .unwrap()
            .unwrap();
        assert!(resp.text.contains("Olá, &lt;Ana &amp; Bia&gt;!"));
    }

    #[test]
    fn welcome_template_is_personalized() {
        let mut c = (*cfg(AuthMode::Open, Some(42))).clone();
        c.texts.welcome_message = "Oi *{name}*, fale com {owner} em {github}".to_string();
        let d = Dispatcher::new(Arc::new(c));
        let resp = d.handle_command("start", &ana(7)).unwrap().unwrap();
        assert!(resp.text.contains(
            "Oi <b>Ana</b>, fale com 42 em https://github.com/seu-usuario/telegram-bot-top"
        ));
        no_placeholders(&resp.text);
    }

    #[test]
    fn help_mentions_restriction_only_when_restricted() {
        let open = dispatcher(AuthMode::Open);
        let help = open.handle_command("help", &ana(1)).unwrap().unwrap();
        assert!(!help.text.contains("Segurança"));

        let silent = dispatcher(AuthMode::Silent);
        let help = silent.handle_command("help", &ana(42)).unwrap().unwrap();
        assert!(help.text.contains("<code>42</code>"));
        assert!(help.text.contains("ignoradas"));
    }
}
