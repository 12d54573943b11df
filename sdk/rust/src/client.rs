use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error body.
    #[error("{message} (HTTP {status}, {kind})")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },
}

impl SdkError {
    /// The message the service would show on screen, if it sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            SdkError::Api { message, .. } => Some(message),
            SdkError::Http(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected { address: String },
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Decimal XLM, e.g. `"102.5"`.
    pub total_donated: String,
    pub last_donor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub address: String,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub hash: String,
    pub ledger: u64,
    pub amount: String,
    pub recipient: String,
    pub message: String,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Deserialize)]
struct Connected {
    address: String,
}

#[derive(Debug, Serialize)]
struct DonateRequest<'a> {
    amount: &'a str,
    recipient: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    kind: String,
}

pub struct HopeChainClient {
    client: Client,
    base_url: String,
}

impl HopeChainClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether a wallet is connected and its address persisted.
    pub async fn session(&self) -> Result<ConnectionStatus, SdkError> {
        let resp = self.client.get(self.url("/api/session")).send().await?;
        decode(resp).await
    }

    /// Request wallet access; returns the connected address.
    pub async fn connect(&self) -> Result<String, SdkError> {
        let resp = self.client.post(self.url("/api/connect")).send().await?;
        let connected: Connected = decode(resp).await?;
        Ok(connected.address)
    }

    pub async fn disconnect(&self) -> Result<(), SdkError> {
        let resp = self.client.post(self.url("/api/disconnect")).send().await?;
        check(resp).await.map(|_| ())
    }

    /// Connected address and freshly queried statistics.
    pub async fn stats(&self) -> Result<Dashboard, SdkError> {
        let resp = self.client.get(self.url("/api/stats")).send().await?;
        decode(resp).await
    }

    /// Donate `amount` XLM to `recipient` from the connected wallet.
    pub async fn donate(&self, amount: &str, recipient: &str) -> Result<DonationReceipt, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/donate"))
            .json(&DonateRequest { amount, recipient })
            .send()
            .await?;
        decode(resp).await
    }

    /// Fetch a screen. Redirects are not followed.
    pub async fn screen(&self, path: &str) -> Result<Response, SdkError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(client.get(self.url(path)).send().await?)
    }

    pub async fn health(&self) -> Result<bool, SdkError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status() == StatusCode::OK)
    }
}

async fn check(resp: Response) -> Result<Response, SdkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await?;
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    Err(SdkError::Api {
        status: status.as_u16(),
        kind: body.kind,
        message: if body.error.is_empty() { text } else { body.error },
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    Ok(check(resp).await?.json::<T>().await?)
}
