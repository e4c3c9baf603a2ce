use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{fmt, fmt::writer::MakeWriterExt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize tracing for the bot.
///
/// `RUST_LOG` wins over `level`. When `log_file` is set, every line is written
/// to stdout and appended to that file.
pub fn init(service_name: &str, level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,{service_name}={level},bottop_core={level},bottop_telegram={level}"
        ))
    });

    let builder = fmt().with_env_filter(filter).with_target(false);

    let res = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Arc::new(file)))
                .try_init()
        }
        None => builder.with_ansi(true).try_init(),
    };

    res.map_err(|e| Error::External(format!("failed to init logging: {e}")))
}
