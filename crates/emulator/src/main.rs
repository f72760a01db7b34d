//! ELM327 Emulator - Main Entry Point

use anyhow::Context;
use emulator::{init_logging, EmulatorConfig, EmulatorSession, CONFIG_ENV, DEFAULT_CONFIG_PATH};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = EmulatorConfig::load(&path)
        .with_context(|| format!("loading configuration from {path}"))?;
    init_logging(&config.logging)?;

    info!("=== ELM327 Emulator v{} ===", env!("CARGO_PKG_VERSION"));

    let session = EmulatorSession::new(config);
    let running = session.running();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            running.stop();
        }
    });

    session.run().await.context("emulator session failed")?;
    info!("Emulator stopped");
    Ok(())
}
