//! HopeChain donation service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / hopechain-cli
//!        │
//!        ▼
//!   http (screens + JSON API)
//!        │
//!        ▼
//!   donation::service ──▶ session (walletAddress)
//!        │          └───▶ donation::stats (mock)
//!        ▼
//!   donation::flow
//!        ├─ lookup ─────▶ stellar::client ──▶ Horizon
//!        ├─ build ──────▶ stellar::transaction
//!        ├─ sign ───────▶ stellar::wallet
//!        └─ submit ─────▶ stellar::client ──▶ Horizon
//!
//!   cross-cutting: config · observability · lifecycle
//! ```
//!
//! Configuration comes from the TOML file named by `HOPECHAIN_CONFIG`, or
//! testnet defaults when unset. The signing key is read from
//! `HOPECHAIN_WALLET_SECRET`.

use hopechain::config::load_from_env;
use hopechain::lifecycle::startup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = load_from_env()?;
    startup::run(config).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
