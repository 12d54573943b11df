//! Donation subsystem.
//!
//! # Data Flow
//! ```text
//! Connection screen
//!     → service.rs (wallet access, persist `walletAddress`)
//! Donation screen
//!     → service.rs (address + stats.rs snapshot)
//!     → form.rs (validate amount / recipient, no network)
//!     → flow.rs (lookup → build → sign → submit, exactly once)
//! ```
//!
//! # Design Decisions
//! - Every failure is surfaced to the user; nothing is retried
//! - Statistics are synthetic and only bumped locally after a donation

pub mod error;
pub mod flow;
pub mod form;
pub mod service;
pub mod stats;

pub use error::{DonationError, DonationResult};
pub use flow::PaymentFlow;
pub use form::{DonationForm, DonationRequest};
pub use service::{ConnectionStatus, Dashboard, DonationReceipt, DonationService};
pub use stats::{fetch_snapshot, MockStats, StatsError, StatsSnapshot, StatsSource};
