//! Donation statistics.
//!
//! Figures come from a [`StatsSource`]. The only source today is
//! [`MockStats`], which makes numbers up: the contract is never queried, so
//! the snapshot does not reflect on-chain donations.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stellar::Amount;

/// Placeholder donors the mock picks from.
pub const MOCK_DONORS: [&str; 2] = [
    "GABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEJXA",
    "GABQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQHGPC",
];

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Statistics unavailable: {0}")]
    Unavailable(String),
}

/// What the donation screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_donated: Amount,
    pub last_donor: Option<String>,
}

impl StatsSnapshot {
    /// Snapshot after a successful donation by `donor`.
    pub fn with_donation(&self, donor: &str, amount: Amount) -> Self {
        Self {
            total_donated: self
                .total_donated
                .checked_add(amount)
                .unwrap_or(self.total_donated),
            last_donor: Some(donor.to_string()),
        }
    }
}

/// Source of donation statistics.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn total_donated(&self) -> Result<Amount, StatsError>;

    async fn last_donor(&self) -> Result<Option<String>, StatsError>;
}

/// Random figures: a whole total in `[100, 1100)` XLM and one of the
/// placeholder donors, or none.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockStats;

#[async_trait]
impl StatsSource for MockStats {
    async fn total_donated(&self) -> Result<Amount, StatsError> {
        let xlm = rand::thread_rng().gen_range(100..1100);
        Ok(Amount::from_xlm(xlm))
    }

    async fn last_donor(&self) -> Result<Option<String>, StatsError> {
        let choices: [Option<&str>; 3] = [Some(MOCK_DONORS[0]), Some(MOCK_DONORS[1]), None];
        let picked = choices.choose(&mut rand::thread_rng()).copied().flatten();
        Ok(picked.map(str::to_string))
    }
}

/// Query both figures concurrently; failures degrade to zero / none.
pub async fn fetch_snapshot(source: &dyn StatsSource) -> StatsSnapshot {
    let (total, last_donor) = tokio::join!(source.total_donated(), source.last_donor());

    let total_donated = total.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error getting total donated");
        Amount::ZERO
    });
    let last_donor = last_donor.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error getting last donor");
        None
    });

    StatsSnapshot {
        total_donated,
        last_donor,
    }
}
