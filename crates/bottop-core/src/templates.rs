//! `{placeholder}` substitution for configured texts.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::{errors::Error, formatting::escape_html, Result};

/// Placeholders accepted in configured texts.
pub const KNOWN_PLACEHOLDERS: &[&str] = &["name", "bot", "version", "developer", "owner", "github"];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z]+)\}").expect("valid placeholder regex"))
}

/// Values substituted into a template. Raw (unescaped) text.
#[derive(Clone, Debug, Default)]
pub struct TemplateVars<'a> {
    pub name: &'a str,
    pub bot: &'a str,
    pub version: &'a str,
    pub developer: &'a str,
    pub owner: &'a str,
    pub github: &'a str,
}

impl TemplateVars<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(self.name),
            "bot" => Some(self.bot),
            "version" => Some(self.version),
            "developer" => Some(self.developer),
            "owner" => Some(self.owner),
            "github" => Some(self.github),
            _ => None,
        }
    }
}

/// Reject templates that reference a placeholder we cannot fill.
pub fn validate(field: &str, template: &str) -> Result<()> {
    for caps in placeholder_re().captures_iter(template) {
        let key = &caps[1];
        if !KNOWN_PLACEHOLDERS.contains(&key) {
            return Err(Error::Template {
                field: field.to_string(),
                placeholder: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Substitute placeholders into an already-HTML template. Values are escaped.
pub fn render(field: &str, template: &str, vars: &TemplateVars<'_>) -> Result<String> {
    validate(field, template)?;
    let out = placeholder_re().replace_all(template, |caps: &Captures<'_>| {
        escape_html(vars.get(&caps[1]).unwrap_or_default())
    });
    Ok(out.into_owned())
}
