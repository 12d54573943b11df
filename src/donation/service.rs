//! Screen logic shared by the HTTP handlers and the CLI.
//!
//! # Responsibilities
//! - Connection screen: check, connect, disconnect
//! - Donation screen: address + statistics, donate
//!
//! The persisted `walletAddress` entry is the only thing gating the donation
//! screen. The stats snapshot is swapped atomically; readers never block.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{AppConfig, StatsMode};
use crate::donation::error::{DonationError, DonationResult};
use crate::donation::flow::PaymentFlow;
use crate::donation::form::DonationForm;
use crate::donation::stats::{fetch_snapshot, MockStats, StatsSnapshot, StatsSource};
use crate::observability::metrics;
use crate::session::SessionStore;
use crate::stellar::{Amount, HorizonClient, WalletProvider};

/// Result of the connection check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected { address: String },
    Disconnected,
}

/// Everything the donation screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub address: String,
    pub stats: StatsSnapshot,
}

/// A submitted donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationReceipt {
    pub hash: String,
    pub ledger: u64,
    pub amount: Amount,
    pub recipient: String,
    pub message: String,
}

pub struct DonationService {
    session: SessionStore,
    wallet: Arc<dyn WalletProvider>,
    flow: PaymentFlow,
    stats: Arc<dyn StatsSource>,
    snapshot: ArcSwap<StatsSnapshot>,
}

impl DonationService {
    pub fn new(
        session: SessionStore,
        wallet: Arc<dyn WalletProvider>,
        flow: PaymentFlow,
        stats: Arc<dyn StatsSource>,
    ) -> Self {
        Self {
            session,
            wallet,
            flow,
            stats,
            snapshot: ArcSwap::from_pointee(StatsSnapshot::default()),
        }
    }

    /// Wire the service from configuration and an already loaded wallet.
    pub fn from_config(
        config: &AppConfig,
        wallet: Arc<dyn WalletProvider>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let session = SessionStore::load_from_file(&config.session.storage_path)?;
        let horizon = HorizonClient::new(&config.network.horizon_url, config.timeouts.horizon_secs)?;
        let flow = PaymentFlow::new(horizon, wallet.clone(), &config.network);
        let stats: Arc<dyn StatsSource> = match config.stats.mode {
            StatsMode::Mock => Arc::new(MockStats),
        };

        tracing::info!(
            contract_id = %config.contract.contract_id,
            stats_mode = ?config.stats.mode,
            session_path = %config.session.storage_path,
            "Donation service ready"
        );
        Ok(Self::new(session, wallet, flow, stats))
    }

    /// Connected only if the wallet is present, access was granted and an
    /// address is persisted.
    pub async fn connection_status(&self) -> ConnectionStatus {
        if !self.wallet.is_connected().await || !self.wallet.is_allowed().await {
            return ConnectionStatus::Disconnected;
        }
        match self.session.wallet_address() {
            Some(address) => ConnectionStatus::Connected { address },
            None => ConnectionStatus::Disconnected,
        }
    }

    /// Ask the wallet for access and persist the returned address.
    pub async fn connect(&self) -> DonationResult<String> {
        if !self.wallet.is_connected().await {
            return Err(DonationError::WalletUnavailable);
        }

        let address = self
            .wallet
            .request_access()
            .await
            .map_err(DonationError::ConnectionFailed)?;
        self.session.set_wallet_address(&address)?;

        metrics::record_session_event("connect");
        tracing::info!(address = %address, "Wallet connected");
        Ok(address)
    }

    /// Forget the persisted address.
    pub fn disconnect(&self) -> DonationResult<()> {
        let previous = self.session.clear_wallet_address()?;
        metrics::record_session_event("disconnect");
        tracing::info!(address = ?previous, "Wallet disconnected");
        Ok(())
    }

    /// Current address and refreshed statistics.
    pub async fn dashboard(&self) -> DonationResult<Dashboard> {
        let address = self.sender().await?;
        let stats = self.refresh_stats().await;
        Ok(Dashboard { address, stats })
    }

    /// Re-query the statistics source and publish the new snapshot.
    pub async fn refresh_stats(&self) -> StatsSnapshot {
        let snapshot = fetch_snapshot(self.stats.as_ref()).await;
        self.snapshot.store(Arc::new(snapshot.clone()));
        snapshot
    }

    /// Last published snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.snapshot.load().as_ref().clone()
    }

    /// Validate the form and run the payment flow for the connected address.
    pub async fn donate(&self, form: &DonationForm) -> DonationResult<DonationReceipt> {
        let result = self.try_donate(form).await;
        let outcome = match &result {
            Ok(_) => "submitted",
            Err(DonationError::Validation(_)) | Err(DonationError::NotConnected) => "rejected",
            Err(_) => "failed",
        };
        metrics::record_donation(outcome);
        if let Err(e) = &result {
            tracing::warn!(kind = e.kind(), error = %e, "Donation not completed");
        }
        result
    }

    async fn try_donate(&self, form: &DonationForm) -> DonationResult<DonationReceipt> {
        let sender = self.sender().await?;
        let request = form.validate()?;

        let submitted = self
            .flow
            .make_donation(&sender, &request.recipient, &request.amount.to_string())
            .await?;

        self.snapshot
            .rcu(|current| current.with_donation(&sender, request.amount));

        tracing::info!(
            hash = %submitted.hash,
            amount = %request.amount,
            recipient = %request.recipient,
            "Donation submitted"
        );

        Ok(DonationReceipt {
            message: format!("Successfully donated {} XLM!", request.amount),
            hash: submitted.hash,
            ledger: submitted.ledger,
            amount: request.amount,
            recipient: request.recipient,
        })
    }

    /// The wallet's current address, or the persisted one if the wallet
    /// does not answer. Fails when nothing is persisted.
    async fn sender(&self) -> DonationResult<String> {
        let saved = self
            .session
            .wallet_address()
            .ok_or(DonationError::NotConnected)?;
        match self.wallet.get_address().await {
            Ok(address) if !address.trim().is_empty() => Ok(address),
            _ => Ok(saved),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}

impl std::fmt::Debug for DonationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DonationService")
            .field("session", &self.session)
            .field("flow", &self.flow)
            .finish_non_exhaustive()
    }
}
