//! Donation error taxonomy.
//!
//! Every failure is surfaced to the user as a message; nothing is retried.

use thiserror::Error;

use crate::session::SessionError;
use crate::stellar::{StellarError, WalletError};

/// Errors surfaced by the connection and donation screens.
#[derive(Debug, Error)]
pub enum DonationError {
    /// No wallet is installed / configured.
    #[error("Wallet is not available. Configure a signing key first.")]
    WalletUnavailable,

    /// The wallet did not grant access.
    #[error("Connection failed: {0}")]
    ConnectionFailed(WalletError),

    /// No address is persisted; the donation screen is unreachable.
    #[error("No wallet connected. Connect a wallet first.")]
    NotConnected,

    /// Form input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// Sender account could not be loaded.
    #[error("Donation failed: {0}")]
    AccountLookup(StellarError),

    /// Transaction could not be constructed.
    #[error("Donation failed: {0}")]
    Build(StellarError),

    /// The wallet refused or failed to sign.
    #[error("Donation failed: {0}")]
    Signing(WalletError),

    /// Horizon rejected or never received the signed transaction.
    #[error("Donation failed: {0}")]
    Submission(StellarError),

    /// Persisted session could not be read or written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl DonationError {
    /// Short machine-readable kind, used in API responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DonationError::WalletUnavailable => "wallet_unavailable",
            DonationError::ConnectionFailed(_) => "connection_failed",
            DonationError::NotConnected => "not_connected",
            DonationError::Validation(_) => "validation",
            DonationError::AccountLookup(_) => "account_lookup",
            DonationError::Build(_) => "build",
            DonationError::Signing(_) => "signing",
            DonationError::Submission(_) => "submission",
            DonationError::Session(_) => "session",
        }
    }
}

pub type DonationResult<T> = Result<T, DonationError>;
