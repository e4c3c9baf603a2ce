use std::path::PathBuf;

/// Core error type.
///
/// Adapter crates map their specific errors into this type so the update
/// handler can treat every failure the same way (log + user-facing message).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("template error: unknown placeholder {{{placeholder}}} in {field}")]
    Template { field: String, placeholder: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
