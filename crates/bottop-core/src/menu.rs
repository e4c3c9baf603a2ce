//! Menu navigation: screens, actions and the callback routing table.

use std::collections::HashMap;

use crate::{
    config::EmojiSet,
    messaging::types::{InlineButton, InlineKeyboard},
};

pub const MENU_PREFIX: &str = "menu_";
pub const BACK_PREFIX: &str = "back_";
pub const BACK_MENU: &str = "back_menu";
pub const BACK_TO_MENU: &str = "back_to_menu";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Main,
    About,
    Settings,
    Help,
    Contact,
}

impl Screen {
    /// Screens reachable from the main menu, in button order.
    pub const SUB_SCREENS: [Screen; 4] = [
        Screen::About,
        Screen::Settings,
        Screen::Help,
        Screen::Contact,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Screen::Main => "main",
            Screen::About => "about",
            Screen::Settings => "settings",
            Screen::Help => "help",
            Screen::Contact => "contact",
        }
    }

    /// Callback data of the button that opens this screen.
    pub fn callback_data(self) -> Option<String> {
        match self {
            Screen::Main => None,
            other => Some(format!("{MENU_PREFIX}{}", other.id())),
        }
    }

    pub fn button_label(self, emojis: &EmojiSet) -> String {
        match self {
            Screen::Main => format!("{} Menu Principal", emojis.home),
            Screen::About => format!("{} Sobre", emojis.info),
            Screen::Settings => format!("{} Config", emojis.settings),
            Screen::Help => format!("{} Ajuda", emojis.info),
            Screen::Contact => format!("{} Contato", emojis.info),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Open(Screen),
    Back,
}

impl MenuAction {
    /// Transition function of the menu state machine.
    ///
    /// The target never depends on the screen the button was pressed on, so a
    /// button on a stale message still lands on a valid screen.
    pub fn target(self) -> Screen {
        match self {
            MenuAction::Open(screen) => screen,
            MenuAction::Back => Screen::Main,
        }
    }
}

/// Outcome of looking up a callback identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Action(MenuAction),
    /// Carries a menu prefix but names no known screen.
    UnknownScoped,
    /// Not a menu identifier at all.
    Unscoped,
}

/// Callback identifier → action.
#[derive(Clone, Debug)]
pub struct CallbackRoutes {
    table: HashMap<String, MenuAction>,
}

impl Default for CallbackRoutes {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRoutes {
    pub fn new() -> Self {
        let mut table: HashMap<String, MenuAction> = Screen::SUB_SCREENS
            .iter()
            .filter_map(|s| s.callback_data().map(|data| (data, MenuAction::Open(*s))))
            .collect();
        table.insert(BACK_MENU.to_string(), MenuAction::Back);
        table.insert(BACK_TO_MENU.to_string(), MenuAction::Back);
        Self { table }
    }

    pub fn resolve(&self, data: &str) -> Route {
        if let Some(action) = self.table.get(data) {
            return Route::Action(*action);
        }
        if data.starts_with(MENU_PREFIX) || data.starts_with(BACK_PREFIX) {
            Route::UnknownScoped
        } else {
            Route::Unscoped
        }
    }

    pub fn contains(&self, data: &str) -> bool {
        self.table.contains_key(data)
    }
}

/// Four navigation buttons (two per row) plus the repository link.
pub fn main_keyboard(emojis: &EmojiSet, github: &str) -> InlineKeyboard {
    let nav = Screen::SUB_SCREENS
        .iter()
        .filter_map(|s| {
            s.callback_data()
                .map(|data| InlineButton::callback(s.button_label(emojis), data))
        })
        .collect();
    let mut kb = InlineKeyboard::chunked(nav, 2);
    kb.rows.push(vec![InlineButton::url("🌐 GitHub", github)]);
    kb
}

/// The single "back to main menu" row shown on every sub-screen.
pub fn back_keyboard(emojis: &EmojiSet) -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![InlineButton::callback(
        format!("{} Voltar", emojis.back),
        BACK_MENU,
    )]])
}
