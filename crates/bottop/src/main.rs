use std::sync::Arc;

use bottop_core::{config::Config, security::mask_token};
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), bottop_core::Error> {
    let cfg = Arc::new(Config::load()?);
    bottop_core::logging::init("bottop", &cfg.log_level, cfg.log_file.as_deref())?;

    print_banner(&cfg);
    info!(
        bot = %cfg.texts.bot_name,
        version = %cfg.texts.version,
        mode = %cfg.policy.mode,
        owner_id = ?cfg.policy.owner_id,
        "starting"
    );

    bottop_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| bottop_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

fn print_banner(cfg: &Config) {
    let policy = &cfg.policy;
    println!("🤖 Iniciando {} v{}...", cfg.texts.bot_name, cfg.texts.version);
    println!("🔑 Token: {}", mask_token(&cfg.bot_token));
    match policy.owner_id {
        Some(owner) => println!("👤 ID autorizado: {owner}"),
        None => println!("👤 ID autorizado: (nenhum)"),
    }
    if !policy.admin_ids.is_empty() {
        let admins: Vec<String> = policy.admin_ids.iter().map(|id| id.to_string()).collect();
        println!("🛡️ Admins: {}", admins.join(", "));
    }
    println!("🔒 Modo de acesso: {}", policy.mode);
}
