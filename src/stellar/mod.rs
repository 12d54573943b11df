//! Stellar network integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (secret seed)
//!     → wallet.rs (access, signing)
//! Horizon URL + timeouts
//!     → client.rs (account lookup, submission)
//! Account + recipient + amount
//!     → transaction.rs (build, hash, encode)
//! ```
//!
//! # Security Constraints
//! - Secret seeds ONLY from environment variables
//! - Never log secrets
//! - All Horizon calls have configurable timeouts
//! - No retries on submission

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::HorizonClient;
pub use transaction::PaymentBuilder;
pub use types::{Account, AccountId, Amount, StellarError, StellarResult, SubmitResponse};
pub use wallet::{KeypairWallet, SignOptions, UnavailableWallet, WalletError, WalletProvider};
