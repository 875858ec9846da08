//! Backend entry-point: loads settings, wires the HTTP server and serves the
//! API until shutdown.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|error| eyre!("failed to load settings: {error}"))?;
    let config = ServerConfig::from_settings(&settings).wrap_err("invalid settings")?;
    let (host, port) = config.bind_addr();
    info!(host, port, "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to bind server")?;
    server.await.wrap_err("server terminated abnormally")?;
    health_state.mark_unhealthy();
    Ok(())
}
