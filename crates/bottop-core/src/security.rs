use std::{fmt, str::FromStr};

use crate::{domain::UserId, errors::Error};

// ============== Authorization ==============

/// How the bot treats users that are not the configured owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Everyone may use the bot; the owner only gets a marker.
    Open,
    /// Only the owner may use the bot; others get "Acesso negado".
    ExplicitDenial,
    /// Only the owner may use the bot; others get no reply at all.
    Silent,
}

impl AuthMode {
    pub fn is_restricted(self) -> bool {
        !matches!(self, AuthMode::Open)
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::Open => "open",
            AuthMode::ExplicitDenial => "explicit-denial",
            AuthMode::Silent => "silent",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(AuthMode::Open),
            "explicit" | "explicit-denial" | "deny" => Ok(AuthMode::ExplicitDenial),
            "silent" => Ok(AuthMode::Silent),
            other => Err(Error::Config(format!(
                "AUTH_MODE must be open, explicit or silent (got {other:?})"
            ))),
        }
    }
}

/// Display role of an identity. Not used for enforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Admin,
    User,
}

/// Result of checking one identity against the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed(Role),
    Denied,
    Ignored,
}

impl AccessDecision {
    pub fn outcome(self) -> &'static str {
        match self {
            AccessDecision::Allowed(_) => "authorized",
            AccessDecision::Denied => "denied",
            AccessDecision::Ignored => "ignored",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthorizationPolicy {
    pub mode: AuthMode,
    pub owner_id: Option<i64>,
    pub admin_ids: Vec<i64>,
}

impl AuthorizationPolicy {
    pub fn new(mode: AuthMode, owner_id: Option<i64>, admin_ids: Vec<i64>) -> Self {
        Self {
            mode,
            owner_id,
            admin_ids,
        }
    }

    pub fn role_of(&self, user_id: UserId) -> Role {
        if self.owner_id == Some(user_id.0) {
            Role::Owner
        } else if self.admin_ids.contains(&user_id.0) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Pure function of the user id; recomputed for every update.
    pub fn check(&self, user_id: UserId) -> AccessDecision {
        let role = self.role_of(user_id);
        match (self.mode, role) {
            (AuthMode::Open, role) => AccessDecision::Allowed(role),
            (_, Role::Owner) => AccessDecision::Allowed(Role::Owner),
            (AuthMode::ExplicitDenial, _) => AccessDecision::Denied,
            (AuthMode::Silent, _) => AccessDecision::Ignored,
        }
    }
}

// ============== Secrets ==============

/// Mask a bot token for display: keep the public bot id, hide the secret.
///
/// `8193776420:AAH...` becomes `8193776420:***`. Anything that is not
/// `<digits>:<secret>` is fully masked.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{id}:***")
        }
        _ => "***".to_string(),
    }
}
