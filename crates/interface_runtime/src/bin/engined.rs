//! Lifecycle engine daemon

use std::sync::Arc;
use tracing::info;

use core_kernel::SystemClock;
use interface_runtime::{telemetry, Engine, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = EngineConfig::from_env()?;
    telemetry::init(&config.log_level);
    info!(?config, "configuration loaded");

    let engine = Engine::assemble(&config, Arc::new(SystemClock));
    let tasks = engine.start();

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping scheduler loops");

    for handle in tasks.scheduler {
        handle.abort();
    }
    tasks.dispatch_retry.abort();

    Ok(())
}
