pub mod accounts;
pub mod api;
pub mod authorization;
pub mod care_team;
pub mod config;
pub mod core_state;
pub mod crypto;
pub mod db;
pub mod medications;
pub mod models;
pub mod peak_flow;
pub mod readings;
pub mod self_care;
pub mod triage;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::Config::from_env()?;
    let core = core_state::CoreState::from_config(&config);
    core.initialize()?;
    if !config.require_care_link {
        tracing::warn!("Care-link enforcement disabled: any doctor can read any patient");
    }

    api::serve(Arc::new(core), config.bind, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
