//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize observability from the loaded configuration
//! - Load the wallet and build the donation service
//! - Bind the listener and serve until shutdown
//!
//! Any startup error is fatal. The listener binds last, so traffic only
//! arrives once everything else is ready.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::donation::DonationService;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::stellar::wallet::load_wallet;

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Build the HTTP server for `config`, loading the wallet from the environment.
pub fn build_server(config: &AppConfig) -> Result<HttpServer, StartupError> {
    let wallet = load_wallet(
        &config.wallet.secret_env_var,
        &config.network.network_passphrase,
    );
    let service = Arc::new(DonationService::from_config(config, wallet)?);
    Ok(HttpServer::new(config, service))
}

/// Run the service until SIGINT / SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    tracing::info!(
        horizon_url = %config.network.horizon_url,
        network = %config.network.network_passphrase,
        "Starting HopeChain"
    );

    let server = build_server(&config)?;

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
