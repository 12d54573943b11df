//! Horizon REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Load account state (sequence number) for transaction building
//! - Submit signed envelopes
//! - Map Horizon problem documents to typed errors
//!
//! Every call is a single attempt. Submissions in particular are never
//! retried: a retry after an ambiguous failure could pay twice.

use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::observability::metrics;
use crate::stellar::types::{
    Account, AccountId, ResultCodes, StellarError, StellarResult, SubmitResponse,
};

/// Account record as returned by `GET /accounts/{id}`.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    account_id: String,
    /// Horizon encodes the 64-bit sequence as a string.
    sequence: String,
}

/// RFC 7807 problem document returned on errors.
#[derive(Debug, Default, Deserialize)]
struct Problem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
}

/// Horizon client wrapper.
#[derive(Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HorizonClient {
    /// Create a new Horizon client.
    ///
    /// # Arguments
    /// * `horizon_url` - Base URL of the Horizon server
    /// * `timeout_secs` - Per-call timeout
    pub fn new(horizon_url: &str, timeout_secs: u64) -> StellarResult<Self> {
        let mut base_url: Url = horizon_url.parse().map_err(|e| {
            StellarError::Http(format!("Invalid Horizon URL '{}': {}", horizon_url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("hopechain/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StellarError::Http(e.to_string()))?;

        tracing::info!(horizon_url = %base_url, timeout_secs, "Horizon client initialized");

        Ok(Self {
            http,
            base_url,
            timeout_secs,
        })
    }

    fn endpoint(&self, path: &str) -> StellarResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| StellarError::Http(format!("Invalid Horizon path '{}': {}", path, e)))
    }

    fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load the account's current sequence number.
    pub async fn load_account(&self, account_id: &AccountId) -> StellarResult<Account> {
        let start = Instant::now();
        let url = self.endpoint(&format!("accounts/{}", account_id))?;

        let result = timeout(self.timeout_duration(), async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| StellarError::Http(e.to_string()))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(StellarError::AccountNotFound(account_id.to_string()));
            }
            if !status.is_success() {
                return Err(problem_error(status, response).await);
            }

            let record: AccountRecord = response
                .json()
                .await
                .map_err(|e| StellarError::Http(format!("Malformed account record: {}", e)))?;
            parse_account(record)
        })
        .await
        .unwrap_or_else(|_| Err(StellarError::Timeout(self.timeout_secs)));

        metrics::record_horizon_call("load_account", result.is_ok(), start);
        match &result {
            Ok(account) => tracing::debug!(
                account = %account.account_id,
                sequence = account.sequence,
                "Account loaded"
            ),
            Err(e) => tracing::warn!(account = %account_id, error = %e, "Account lookup failed"),
        }
        result
    }

    /// Submit a signed envelope. Exactly one attempt.
    pub async fn submit_transaction(&self, envelope_xdr: &str) -> StellarResult<SubmitResponse> {
        let start = Instant::now();
        let url = self.endpoint("transactions")?;

        let result = timeout(self.timeout_duration(), async {
            let response = self
                .http
                .post(url)
                .form(&[("tx", envelope_xdr)])
                .send()
                .await
                .map_err(|e| StellarError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(problem_error(status, response).await);
            }

            response
                .json::<SubmitResponse>()
                .await
                .map_err(|e| StellarError::Http(format!("Malformed submit response: {}", e)))
        })
        .await
        .unwrap_or_else(|_| Err(StellarError::Timeout(self.timeout_secs)));

        metrics::record_horizon_call("submit_transaction", result.is_ok(), start);
        match &result {
            Ok(submitted) => tracing::info!(
                hash = %submitted.hash,
                ledger = submitted.ledger,
                "Transaction submitted"
            ),
            Err(e) => tracing::warn!(error = %e, "Transaction submission failed"),
        }
        result
    }
}

impl std::fmt::Debug for HorizonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn parse_account(record: AccountRecord) -> StellarResult<Account> {
    let account_id: AccountId = record.account_id.parse()?;
    let sequence = record.sequence.parse::<i64>().map_err(|_| {
        StellarError::Http(format!("Malformed sequence number '{}'", record.sequence))
    })?;
    Ok(Account {
        account_id,
        sequence,
    })
}

async fn problem_error(status: reqwest::StatusCode, response: reqwest::Response) -> StellarError {
    let problem: Problem = response.json().await.unwrap_or_default();
    let title = match (problem.title.is_empty(), problem.detail) {
        (false, _) => problem.title,
        (true, Some(detail)) => detail,
        (true, None) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };
    StellarError::Horizon {
        status: status.as_u16(),
        title,
        result_codes: problem.extras.and_then(|extras| extras.result_codes),
    }
}
