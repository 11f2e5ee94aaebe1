pub mod api;
pub mod appointment; // Appointment booking rules
pub mod composite; // Root + children in one transaction
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod prescriptions; // Visit -> prescription -> medications
pub mod visits; // Visit + triage intake

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Start the clinic API and serve until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path.display(),
        auto_create_visits = config.auto_create_visits,
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let core = Arc::new(core_state::CoreState::open(config).context("failed to open database")?);

    let mut server = api::start_server(core, bind_addr)
        .await
        .context("failed to start API server")?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Ctrl-C received, shutting down");

    server.shutdown();
    server.stopped().await;
    Ok(())
}
