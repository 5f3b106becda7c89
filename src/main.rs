//! # Watch Party Server
//!
//! Entry point: initializes logging, loads configuration and serves the
//! HTTP API and WebSocket gateway until interrupted.

use anyhow::Result;
use tracing::info;

use watch_party_server::config::Settings;
use watch_party_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    watch_party_server::telemetry::init_tracing();

    info!("Starting Watch Party Server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        grace_period_secs = settings.rooms.grace_period_secs,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
